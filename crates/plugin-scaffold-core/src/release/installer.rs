//! Download and extraction of a resolved release into a game directory

use super::resolver::ReleaseDescriptor;
use crate::error::{ProvisionError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::ZipArchive;

/// Default timeout for a release download
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Download/extract capability used by [`Installer`]
#[allow(async_fn_in_trait)]
pub trait ArtifactTransport {
    /// Fetch `url` into the file at `dest`, returning the number of bytes written
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;

    /// Unpack `archive` into `dest`, returning the number of files written
    fn extract(&self, archive: &Path, dest: &Path) -> Result<usize> {
        extract_zip(archive, dest)
    }
}

/// HTTP transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Use a preconfigured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ArtifactTransport for HttpTransport {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let failed = |reason: String| ProvisionError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(describe_request_error(&e)))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| failed(describe_request_error(&e)))?;

        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| failed(format!("cannot write {}: {}", dest.display(), e)))?;

        Ok(body.len() as u64)
    }
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    }
}

/// What an install wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub target: PathBuf,
    pub bytes_downloaded: u64,
    pub files_extracted: usize,
}

/// Materializes a release into a game directory
pub struct Installer<T> {
    transport: T,
}

impl<T: ArtifactTransport> Installer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Download `release` to a scoped temporary directory and extract it over `target`.
    ///
    /// The temporary directory is removed whether or not the install succeeded.
    pub async fn install(&self, release: &ReleaseDescriptor, target: &Path) -> Result<InstallReport> {
        if !target.is_dir() {
            return Err(ProvisionError::NotFound(target.to_path_buf()));
        }

        let staging = tempfile::Builder::new()
            .prefix("plugin-scaffold-")
            .tempdir()?;
        let archive = staging.path().join(&release.file_name);

        tracing::info!(url = %release.download_url, target = %target.display(), "installing release");
        let result = self.download_and_extract(release, &archive, target).await;

        if let Err(e) = staging.close() {
            tracing::warn!(error = %e, "failed to remove download staging directory");
        }

        result
    }

    async fn download_and_extract(
        &self,
        release: &ReleaseDescriptor,
        archive: &Path,
        target: &Path,
    ) -> Result<InstallReport> {
        let bytes_downloaded = self
            .transport
            .download(&release.download_url, archive)
            .await?;
        tracing::debug!(bytes = bytes_downloaded, "download complete");

        let files_extracted = self.transport.extract(archive, target)?;

        Ok(InstallReport {
            target: target.to_path_buf(),
            bytes_downloaded,
            files_extracted,
        })
    }
}

/// Extract every entry of a zip archive into `dest`, overwriting existing files
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let failed = |reason: String| ProvisionError::ExtractFailed {
        archive: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(|e| failed(e.to_string()))?;
    let mut zip = ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| failed(e.to_string()))?;

        // Entries escaping the destination are skipped
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(entry = entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| failed(e.to_string()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }

        let mut out = File::create(&out_path)
            .map_err(|e| failed(format!("{}: {}", out_path.display(), e)))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| failed(format!("{}: {}", out_path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode));
            }
        }

        written += 1;
    }

    Ok(written)
}
