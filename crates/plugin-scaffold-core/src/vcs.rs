//! Git repository bootstrap for a freshly generated project
//!
//! Runs the stock `git` binary; only exit status is inspected.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for a single git invocation
const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for setting up version control
#[derive(Debug, Clone)]
pub struct GitSetup {
    pub remote_url: Option<String>,
    pub commit_message: String,
}

impl Default for GitSetup {
    fn default() -> Self {
        Self {
            remote_url: None,
            commit_message: "Initial commit".to_string(),
        }
    }
}

/// Runs git commands inside a project directory
pub struct Git {
    program: PathBuf,
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: &Path) -> Self {
        Self::with_program("git", dir)
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<PathBuf>, dir: &Path) -> Self {
        Self {
            program: program.into(),
            dir: dir.to_path_buf(),
        }
    }

    /// Check if git is installed and runnable
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Whether the directory is already a repository
    pub fn is_repository(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// `init`, optional `remote add origin`, `add -A`, `commit`
    pub async fn bootstrap(&self, setup: &GitSetup) -> Result<()> {
        if !self.is_repository() {
            self.run(&["init"]).await?;
        }
        if let Some(remote) = setup.remote_url.as_deref().filter(|r| !r.trim().is_empty()) {
            self.run(&["remote", "add", "origin", remote.trim()]).await?;
        }
        self.run(&["add", "-A"]).await?;
        self.run(&["commit", "-m", &setup.commit_message]).await?;
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!(dir = %self.dir.display(), "running {}", command);

        let child = TokioCommand::new(&self.program)
            .args(args)
            .current_dir(&self.dir)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", command))?;

        let output = match timeout(GIT_TIMEOUT, child.wait_with_output()).await {
            Ok(result) => result.with_context(|| format!("Failed to wait for {}", command))?,
            Err(_) => anyhow::bail!(
                "{} timed out after {} seconds",
                command,
                GIT_TIMEOUT.as_secs()
            ),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} failed with exit code {}: {}",
                command,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }
        Ok(())
    }
}
