//! Mapping of (version, host platform, architecture) to a BepInEx release asset

use crate::runtime::Architecture;
use std::fmt;

/// Where release assets are published
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://github.com/BepInEx/BepInEx/releases/download";

const COMPONENT: &str = "BepInEx";

/// A release that still uses the pre-5.4.22 asset naming
#[derive(Debug, Clone, Copy)]
pub struct LegacyRelease {
    /// Version as typed by the user / used in the release tag
    pub version: &'static str,
    /// Four-part version baked into the asset file names
    pub file_version: &'static str,
}

/// Releases published with the old `BepInEx_{x86|x64|unix}_{file_version}.zip` names
pub const LEGACY_RELEASES: &[LegacyRelease] = &[LegacyRelease {
    version: "5.4.21",
    file_version: "5.4.21.0",
}];

/// Operating system family of the machine running the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            HostPlatform::Windows
        } else if cfg!(target_os = "linux") {
            HostPlatform::Linux
        } else if cfg!(target_os = "macos") {
            HostPlatform::MacOs
        } else {
            HostPlatform::Other
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostPlatform::Windows => "windows",
            HostPlatform::Linux => "linux",
            HostPlatform::MacOs => "macos",
            HostPlatform::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Something the caller should tell the user about a resolved release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAdvisory {
    /// Game architecture was unknown; the 64-bit build was picked
    ArchitectureDefaulted,
    /// No 32-bit build exists for the host platform; the 64-bit build was picked
    ArchitectureUnavailable,
    /// Host platform is unsupported; the Windows 64-bit build was picked
    PlatformDefaulted,
}

impl fmt::Display for ReleaseAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseAdvisory::ArchitectureDefaulted => write!(
                f,
                "Could not detect the game architecture, assuming 64-bit"
            ),
            ReleaseAdvisory::ArchitectureUnavailable => write!(
                f,
                "No 32-bit build exists for this platform, using the 64-bit build"
            ),
            ReleaseAdvisory::PlatformDefaulted => write!(
                f,
                "Unsupported host platform, falling back to the Windows x64 build"
            ),
        }
    }
}

/// A downloadable release asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub version: String,
    pub platform_tag: &'static str,
    pub file_name: String,
    pub download_url: String,
    pub advisory: Option<ReleaseAdvisory>,
}

/// Resolve against the public GitHub releases
pub fn resolve(version: &str, platform: HostPlatform, arch: Architecture) -> ReleaseDescriptor {
    resolve_with_base(DEFAULT_RELEASE_BASE_URL, version, platform, arch)
}

/// Resolve against a custom release mirror
pub fn resolve_with_base(
    base_url: &str,
    version: &str,
    platform: HostPlatform,
    arch: Architecture,
) -> ReleaseDescriptor {
    let version = version.trim().trim_start_matches('v');
    let (platform_tag, advisory) = platform_tag(version, platform, arch);

    let file_name = match legacy_release(version) {
        Some(legacy) => format!(
            "{}_{}_{}.zip",
            COMPONENT,
            legacy_file_tag(platform_tag),
            legacy.file_version
        ),
        None => format!("{}_{}_{}.zip", COMPONENT, platform_tag, version),
    };

    let download_url = format!(
        "{}/v{}/{}",
        base_url.trim_end_matches('/'),
        version,
        file_name
    );

    ReleaseDescriptor {
        version: version.to_string(),
        platform_tag,
        file_name,
        download_url,
        advisory,
    }
}

/// Whether `version` uses the legacy naming
pub fn legacy_release(version: &str) -> Option<&'static LegacyRelease> {
    LEGACY_RELEASES.iter().find(|r| r.version == version)
}

fn platform_tag(
    version: &str,
    platform: HostPlatform,
    arch: Architecture,
) -> (&'static str, Option<ReleaseAdvisory>) {
    let legacy = legacy_release(version).is_some();
    let unknown =
        (arch == Architecture::Unknown).then_some(ReleaseAdvisory::ArchitectureDefaulted);

    match platform {
        HostPlatform::Windows => match arch {
            Architecture::X86 => ("win_x86", None),
            Architecture::X64 => ("win_x64", None),
            Architecture::Unknown => ("win_x64", unknown),
        },
        // The legacy unix bundle covers both architectures
        HostPlatform::Linux | HostPlatform::MacOs if legacy => ("unix", unknown),
        HostPlatform::Linux | HostPlatform::MacOs => {
            let tag = if platform == HostPlatform::Linux {
                "linux_x64"
            } else {
                "macos_x64"
            };
            let advisory = match arch {
                Architecture::X86 => Some(ReleaseAdvisory::ArchitectureUnavailable),
                Architecture::X64 => None,
                Architecture::Unknown => unknown,
            };
            (tag, advisory)
        }
        HostPlatform::Other => ("win_x64", Some(ReleaseAdvisory::PlatformDefaulted)),
    }
}

/// Legacy assets drop the `win_` prefix: `win_x86` -> `x86`
fn legacy_file_tag(platform_tag: &'static str) -> &'static str {
    platform_tag.strip_prefix("win_").unwrap_or(platform_tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_release_windows_x86() {
        let release = resolve("5.4.21", HostPlatform::Windows, Architecture::X86);
        assert_eq!(release.platform_tag, "win_x86");
        assert_eq!(release.file_name, "BepInEx_x86_5.4.21.0.zip");
        assert_eq!(
            release.download_url,
            "https://github.com/BepInEx/BepInEx/releases/download/v5.4.21/BepInEx_x86_5.4.21.0.zip"
        );
        assert_eq!(release.advisory, None);
    }

    #[test]
    fn test_legacy_release_unix() {
        let linux = resolve("5.4.21", HostPlatform::Linux, Architecture::X64);
        let mac = resolve("5.4.21", HostPlatform::MacOs, Architecture::X64);
        assert_eq!(linux.platform_tag, "unix");
        assert_eq!(linux.file_name, "BepInEx_unix_5.4.21.0.zip");
        assert_eq!(mac.file_name, linux.file_name);
    }

    #[test]
    fn test_modern_release_windows_x64() {
        let release = resolve("5.4.22", HostPlatform::Windows, Architecture::X64);
        assert_eq!(release.platform_tag, "win_x64");
        assert_eq!(release.file_name, "BepInEx_win_x64_5.4.22.zip");
        assert_eq!(
            release.download_url,
            "https://github.com/BepInEx/BepInEx/releases/download/v5.4.22/BepInEx_win_x64_5.4.22.zip"
        );
    }

    #[test]
    fn test_modern_platform_tags() {
        let tags: Vec<_> = [
            (HostPlatform::Windows, Architecture::X86),
            (HostPlatform::Windows, Architecture::X64),
            (HostPlatform::Linux, Architecture::X64),
            (HostPlatform::MacOs, Architecture::X64),
        ]
        .into_iter()
        .map(|(p, a)| resolve("5.4.23.2", p, a).file_name)
        .collect();

        assert_eq!(
            tags,
            vec![
                "BepInEx_win_x86_5.4.23.2.zip",
                "BepInEx_win_x64_5.4.23.2.zip",
                "BepInEx_linux_x64_5.4.23.2.zip",
                "BepInEx_macos_x64_5.4.23.2.zip",
            ]
        );
    }

    #[test]
    fn test_unknown_inputs_default_with_advisory() {
        let arch = resolve("5.4.22", HostPlatform::Windows, Architecture::Unknown);
        assert_eq!(arch.platform_tag, "win_x64");
        assert_eq!(arch.advisory, Some(ReleaseAdvisory::ArchitectureDefaulted));

        let platform = resolve("5.4.22", HostPlatform::Other, Architecture::X86);
        assert_eq!(platform.platform_tag, "win_x64");
        assert_eq!(platform.advisory, Some(ReleaseAdvisory::PlatformDefaulted));

        let legacy_unknown = resolve("5.4.21", HostPlatform::Windows, Architecture::Unknown);
        assert_eq!(legacy_unknown.file_name, "BepInEx_x64_5.4.21.0.zip");
    }

    #[test]
    fn test_unknown_architecture_is_reported_on_every_platform() {
        for (version, platform, tag) in [
            ("5.4.22", HostPlatform::Linux, "linux_x64"),
            ("5.4.22", HostPlatform::MacOs, "macos_x64"),
            ("5.4.21", HostPlatform::Linux, "unix"),
            ("5.4.21", HostPlatform::MacOs, "unix"),
        ] {
            let release = resolve(version, platform, Architecture::Unknown);
            assert_eq!(release.platform_tag, tag);
            assert_eq!(
                release.advisory,
                Some(ReleaseAdvisory::ArchitectureDefaulted),
                "{} on {}",
                version,
                platform
            );
        }

        let known = resolve("5.4.22", HostPlatform::Linux, Architecture::X64);
        assert_eq!(known.advisory, None);
    }

    #[test]
    fn test_32_bit_game_on_unix_host_gets_64_bit_build() {
        let release = resolve("5.4.22", HostPlatform::MacOs, Architecture::X86);
        assert_eq!(release.platform_tag, "macos_x64");
        assert_eq!(release.advisory, Some(ReleaseAdvisory::ArchitectureUnavailable));

        let legacy = resolve("5.4.21", HostPlatform::Linux, Architecture::X86);
        assert_eq!(legacy.platform_tag, "unix");
        assert_eq!(legacy.advisory, None);
    }

    #[test]
    fn test_resolution_is_deterministic_and_normalized() {
        let a = resolve("v5.4.22", HostPlatform::Linux, Architecture::X86);
        let b = resolve("5.4.22 ", HostPlatform::Linux, Architecture::X86);
        assert_eq!(a, b);
        assert_eq!(a.version, "5.4.22");
    }

    #[test]
    fn test_custom_base_url() {
        let release = resolve_with_base(
            "https://mirror.example.com/bepinex/",
            "5.4.22",
            HostPlatform::Windows,
            Architecture::X86,
        );
        assert_eq!(
            release.download_url,
            "https://mirror.example.com/bepinex/v5.4.22/BepInEx_win_x86_5.4.22.zip"
        );
    }
}
