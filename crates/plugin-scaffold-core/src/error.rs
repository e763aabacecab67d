//! Error taxonomy for provisioning

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the provisioning core.
///
/// Only [`ProvisionError::IncompatibleRuntime`] is fatal to a wizard session.
/// Everything else is either re-prompted or degraded with guidance for the
/// user to finish the step by hand.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(
        "{} has no Managed folder; the game was built with IL2CPP and cannot load Mono plugins",
        .path.display()
    )]
    IncompatibleRuntime { path: PathBuf },

    #[error("no game assembly found in {}", .path.display())]
    NoGameAssembly { path: PathBuf },

    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("failed to extract {}: {reason}", .archive.display())]
    ExtractFailed { archive: PathBuf, reason: String },

    #[error("failed to process template {}: {source}", .path.display())]
    SubstitutionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid skeleton manifest {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("setup cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Whether this error must abort the whole session
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProvisionError::IncompatibleRuntime { .. })
    }
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
