//! Discovery of Unity game installations
//!
//! Games are found by scanning Steam library folders for directories that
//! contain a `<Name>_Data` folder next to the game executable. A path typed
//! by the user goes through the same resolution.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DATA_SUFFIX: &str = "_Data";

/// Where an install candidate came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Found under `<library>/steamapps/common`
    SteamLibrary(PathBuf),
    /// Entered by the user
    Manual,
}

/// A game installation that could be targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCandidate {
    pub display_name: String,
    pub data_dir: PathBuf,
    pub root_dir: PathBuf,
    pub source: SourceLocation,
}

impl InstallCandidate {
    /// File stem shared by the executable and the data folder
    pub fn game_stem(&self) -> Option<&str> {
        self.data_dir
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(DATA_SUFFIX))
    }

    /// Windows executable next to the data folder (may not exist)
    pub fn executable(&self) -> Option<PathBuf> {
        self.game_stem()
            .map(|stem| self.root_dir.join(format!("{}.exe", stem)))
    }
}

/// Default Steam installation roots for the current host
pub fn default_steam_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if cfg!(target_os = "windows") {
        roots.push(PathBuf::from(r"C:\Program Files (x86)\Steam"));
        roots.push(PathBuf::from(r"C:\Program Files\Steam"));
    }

    if let Some(home) = dirs::home_dir() {
        if cfg!(target_os = "macos") {
            roots.push(home.join("Library/Application Support/Steam"));
        } else if cfg!(unix) {
            roots.push(home.join(".steam/steam"));
            roots.push(home.join(".local/share/Steam"));
            roots.push(home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"));
        }
    }

    roots
}

/// Library folders declared in `steamapps/libraryfolders.vdf`, plus the root itself
pub fn steam_libraries(steam_root: &Path) -> Vec<PathBuf> {
    let mut libraries = vec![steam_root.to_path_buf()];

    let vdf = steam_root.join("steamapps").join("libraryfolders.vdf");
    if let Ok(content) = std::fs::read_to_string(&vdf) {
        for path in parse_library_folders(&content) {
            if !libraries.contains(&path) {
                libraries.push(path);
            }
        }
    }

    libraries
}

/// Extract `"path"` entries from a `libraryfolders.vdf` document
pub fn parse_library_folders(vdf: &str) -> Vec<PathBuf> {
    static PATH_ENTRY: OnceLock<Regex> = OnceLock::new();
    let re = PATH_ENTRY.get_or_init(|| {
        Regex::new(r#""path"\s+"((?:[^"\\]|\\.)*)""#).expect("static regex is valid")
    });

    re.captures_iter(vdf)
        .map(|cap| PathBuf::from(cap[1].replace("\\\\", "\\")))
        .collect()
}

/// Scan every library under the given Steam roots for Unity games
pub fn find_installs(steam_roots: &[PathBuf]) -> Vec<InstallCandidate> {
    let mut found: Vec<InstallCandidate> = Vec::new();

    for root in steam_roots.iter().filter(|r| r.is_dir()) {
        for library in steam_libraries(root) {
            let common = library.join("steamapps").join("common");
            let Ok(entries) = std::fs::read_dir(&common) else {
                continue;
            };

            for entry in entries.filter_map(|e| e.ok()) {
                let game_root = entry.path();
                if !game_root.is_dir() {
                    continue;
                }
                if let Some(data_dir) = find_data_dir(&game_root) {
                    let candidate = InstallCandidate {
                        display_name: entry.file_name().to_string_lossy().into_owned(),
                        data_dir,
                        root_dir: game_root,
                        source: SourceLocation::SteamLibrary(library.clone()),
                    };
                    if !found.iter().any(|c| c.root_dir == candidate.root_dir) {
                        found.push(candidate);
                    }
                }
            }
        }
    }

    found.sort_by(|a, b| a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()));
    tracing::debug!(count = found.len(), "located Unity installs");
    found
}

/// Turn a user-supplied path into a candidate.
///
/// Accepts either the game root (containing `<Name>_Data`) or the data
/// directory itself. Returns `None` when neither shape matches.
pub fn resolve_manual(path: &Path) -> Option<InstallCandidate> {
    let is_data_dir = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(DATA_SUFFIX));

    let (root_dir, data_dir) = if is_data_dir && path.is_dir() {
        (path.parent()?.to_path_buf(), path.to_path_buf())
    } else {
        (path.to_path_buf(), find_data_dir(path)?)
    };

    let display_name = root_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            data_dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(DATA_SUFFIX))
                .map(str::to_string)
        })?;

    Some(InstallCandidate {
        display_name,
        data_dir,
        root_dir,
        source: SourceLocation::Manual,
    })
}

/// Find the `<Name>_Data` folder in a game root.
///
/// Prefers the folder whose stem matches an executable in the same root.
fn find_data_dir(game_root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(game_root).ok()?;
    let mut data_dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(DATA_SUFFIX) && n.len() > DATA_SUFFIX.len())
        })
        .collect();
    data_dirs.sort();

    let with_exe = data_dirs.iter().find(|dir| {
        dir.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(DATA_SUFFIX))
            .is_some_and(|stem| {
                game_root.join(format!("{}.exe", stem)).is_file()
                    || game_root.join(format!("{}.x86_64", stem)).is_file()
            })
    });

    with_exe.cloned().or_else(|| data_dirs.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_library_folders() {
        let vdf = r#"
"libraryfolders"
{
	"0"
	{
		"path"		"C:\\Program Files (x86)\\Steam"
		"label"		""
	}
	"1"
	{
		"path"		"/mnt/games/SteamLibrary"
	}
}
"#;
        let paths = parse_library_folders(vdf);
        assert_eq!(
            paths,
            vec![
                PathBuf::from(r"C:\Program Files (x86)\Steam"),
                PathBuf::from("/mnt/games/SteamLibrary"),
            ]
        );
    }

    #[test]
    fn test_find_installs_in_library() {
        let steam = tempfile::tempdir().unwrap();
        let common = steam.path().join("steamapps/common");

        let valheim = common.join("Valheim");
        fs::create_dir_all(valheim.join("valheim_Data/Managed")).unwrap();
        fs::write(valheim.join("valheim.exe"), b"").unwrap();

        // Not a Unity game
        fs::create_dir_all(common.join("Some Source Game/bin")).unwrap();

        let installs = find_installs(&[steam.path().to_path_buf()]);
        assert_eq!(installs.len(), 1);
        let install = &installs[0];
        assert_eq!(install.display_name, "Valheim");
        assert_eq!(install.data_dir, valheim.join("valheim_Data"));
        assert_eq!(install.game_stem(), Some("valheim"));
        assert_eq!(install.executable(), Some(valheim.join("valheim.exe")));
        assert_eq!(
            install.source,
            SourceLocation::SteamLibrary(steam.path().to_path_buf())
        );
    }

    #[test]
    fn test_resolve_manual_accepts_root_or_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("My Game");
        fs::create_dir_all(root.join("MyGame_Data")).unwrap();
        fs::create_dir_all(root.join("MonoBleedingEdge_Data")).unwrap();
        fs::write(root.join("MyGame.exe"), b"").unwrap();

        let from_root = resolve_manual(&root).unwrap();
        assert_eq!(from_root.data_dir, root.join("MyGame_Data"));
        assert_eq!(from_root.display_name, "My Game");
        assert_eq!(from_root.source, SourceLocation::Manual);

        let from_data = resolve_manual(&root.join("MyGame_Data")).unwrap();
        assert_eq!(from_data.root_dir, root);

        assert!(resolve_manual(&dir.path().join("missing")).is_none());
    }
}
