//! Unity engine version probing

use regex::bytes::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// Used when no serialized file yields a version string
pub const DEFAULT_UNITY_VERSION: &str = "2020.3.0f1";

/// Serialized files that carry the engine version near the start, in lookup order
const VERSION_SOURCES: &[&str] = &["globalgamemanagers", "mainData", "data.unity3d"];

const MAX_PROBE_BYTES: u64 = 64 * 1024;

fn version_pattern() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| {
        Regex::new(r"(20\d{2}|[56])\.\d{1,2}\.\d{1,3}[abfpx]\d{1,3}").expect("static regex is valid")
    })
}

/// Find a Unity version string in raw serialized-file bytes
pub fn version_from_bytes(bytes: &[u8]) -> Option<String> {
    version_pattern()
        .find(bytes)
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .map(str::to_string)
}

/// Detect the engine version of the game owning `data_dir`.
///
/// Falls back to [`DEFAULT_UNITY_VERSION`] so callers always receive a value.
pub fn detect_unity_version(data_dir: &Path) -> String {
    read_unity_version(data_dir).unwrap_or_else(|| {
        tracing::debug!(
            data_dir = %data_dir.display(),
            "no engine version found, using default {}",
            DEFAULT_UNITY_VERSION
        );
        DEFAULT_UNITY_VERSION.to_string()
    })
}

/// Like [`detect_unity_version`] but reports whether anything was found
pub fn read_unity_version(data_dir: &Path) -> Option<String> {
    VERSION_SOURCES.iter().find_map(|name| {
        let mut buf = Vec::new();
        File::open(data_dir.join(name))
            .and_then(|f| f.take(MAX_PROBE_BYTES).read_to_end(&mut buf))
            .ok()?;
        let version = version_from_bytes(&buf)?;
        tracing::debug!(source = name, %version, "detected Unity version");
        Some(version)
    })
}

/// `2020.3.28f1` -> `2020.3.28`
pub fn short_version(version: &str) -> &str {
    version
        .find(|c: char| c.is_ascii_alphabetic())
        .map(|idx| &version[..idx])
        .unwrap_or(version)
}
