//! Compatibility checks for a game's data directory

use std::path::{Path, PathBuf};

/// Folder holding the game's IL assemblies
pub const MANAGED_DIR: &str = "Managed";

/// Assembly Unity emits for game scripts by default
pub const MAIN_ASSEMBLY: &str = "Assembly-CSharp.dll";

/// Files that point at an IL2CPP build when found next to the data directory
const IL2CPP_MARKERS: &[&str] = &["GameAssembly.dll", "GameAssembly.so", "il2cpp_data"];

/// Assembly name prefixes belonging to the engine, the BCL or common third-party libraries
const EXCLUDED_PREFIXES: &[&str] = &[
    "Unity",
    "UnityEngine",
    "System",
    "Mono",
    "mscorlib",
    "netstandard",
    "Microsoft",
    "Newtonsoft",
    "Mirror",
    "DOTween",
    "Facepunch",
    "Steamworks",
    "com.rlabrecque",
    "Accessibility",
];

/// Why a data directory was rejected or needs manual follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityFailure {
    /// The data directory does not exist
    NotFound,
    /// No `Managed` folder: ahead-of-time compiled runtime
    IncompatibleRuntime,
    /// `Managed` exists but holds nothing but framework assemblies
    NoGameAssembly,
}

/// Result of validating one data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityResult {
    is_compatible: bool,
    main_assembly: Option<String>,
    failure_reason: Option<CompatibilityFailure>,
    candidates: Vec<String>,
}

impl CompatibilityResult {
    fn rejected(reason: CompatibilityFailure) -> Self {
        Self {
            is_compatible: false,
            main_assembly: None,
            failure_reason: Some(reason),
            candidates: Vec::new(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.is_compatible
    }

    /// The deterministically selected game assembly, if any
    pub fn main_assembly(&self) -> Option<&str> {
        self.main_assembly.as_deref()
    }

    pub fn failure_reason(&self) -> Option<CompatibilityFailure> {
        self.failure_reason
    }

    /// Non-framework assemblies found in `Managed`, sorted by name
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// True when the caller has to pick (or type) the game assembly
    pub fn needs_selection(&self) -> bool {
        self.is_compatible && self.main_assembly.is_none()
    }
}

/// Validate a game data directory (`<Game>_Data`)
pub fn validate(data_dir: &Path) -> CompatibilityResult {
    if !data_dir.is_dir() {
        return CompatibilityResult::rejected(CompatibilityFailure::NotFound);
    }

    let managed = managed_dir(data_dir);
    if !managed.is_dir() {
        let markers = il2cpp_markers(data_dir);
        tracing::info!(
            data_dir = %data_dir.display(),
            ?markers,
            "no Managed folder, rejecting as IL2CPP"
        );
        return CompatibilityResult::rejected(CompatibilityFailure::IncompatibleRuntime);
    }

    let candidates = game_assemblies(&managed);
    tracing::debug!(count = candidates.len(), "candidate game assemblies");

    if candidates.is_empty() {
        return CompatibilityResult {
            is_compatible: true,
            main_assembly: None,
            failure_reason: Some(CompatibilityFailure::NoGameAssembly),
            candidates,
        };
    }

    let main_assembly = candidates
        .iter()
        .find(|name| name.as_str() == MAIN_ASSEMBLY)
        .cloned();

    CompatibilityResult {
        is_compatible: true,
        main_assembly,
        failure_reason: None,
        candidates,
    }
}

/// Path of the managed assembly folder for a data directory
pub fn managed_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(MANAGED_DIR)
}

/// Whether an assembly file name belongs to the engine or the framework
pub fn is_excluded_assembly(file_name: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| file_name.starts_with(prefix))
}

fn game_assemblies(managed: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(managed) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %managed.display(), error = %e, "cannot list Managed folder");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.to_ascii_lowercase().ends_with(".dll"))
        .filter(|name| !is_excluded_assembly(name))
        .collect();
    names.sort();
    names
}

fn il2cpp_markers(data_dir: &Path) -> Vec<&'static str> {
    let root = data_dir.parent().unwrap_or(data_dir);
    IL2CPP_MARKERS
        .iter()
        .copied()
        .filter(|marker| root.join(marker).exists() || data_dir.join(marker).exists())
        .collect()
}
