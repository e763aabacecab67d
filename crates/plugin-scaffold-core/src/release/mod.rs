//! BepInEx release resolution and installation
//!
//! This module provides:
//! - Pure mapping from (version, host platform, architecture) to a release asset
//! - An installer that downloads and extracts that asset through an injected transport

pub mod installer;
pub mod resolver;

pub use installer::{
    extract_zip, ArtifactTransport, HttpTransport, InstallReport, Installer,
    DEFAULT_DOWNLOAD_TIMEOUT,
};
pub use resolver::{
    resolve, resolve_with_base, HostPlatform, ReleaseAdvisory, ReleaseDescriptor,
    DEFAULT_RELEASE_BASE_URL,
};
