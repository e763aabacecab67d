//! Game environment detection
//!
//! This module provides:
//! - Executable architecture inspection (PE header)
//! - Mono/IL2CPP compatibility validation of a game's data directory
//! - Unity engine version probing
//! - Steam library scanning for install candidates

pub mod binary;
pub mod engine;
pub mod locate;
pub mod validator;

pub use binary::{architecture_from_bytes, detect_architecture, Architecture};
pub use engine::{detect_unity_version, DEFAULT_UNITY_VERSION};
pub use locate::{find_installs, resolve_manual, InstallCandidate, SourceLocation};
pub use validator::{validate, CompatibilityFailure, CompatibilityResult};
