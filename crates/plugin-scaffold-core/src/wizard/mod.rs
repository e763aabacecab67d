//! Wizard controller
//!
//! Drives a session through its stages in order:
//!
//! ```text
//! SelectInstall -> ValidateCompatibility -> CollectVariables -> InstallFramework
//!     -> Substitute -> Cleanup -> VersionControlSetup -> Done
//! ```
//!
//! An incompatible runtime aborts the session with
//! [`ProvisionError::IncompatibleRuntime`]. Declining a confirmation gate
//! before substitution ends it with [`Outcome::Cancelled`]. Every other
//! failure is reported to the user and the session moves on.
//!
//! Running two sessions against the same project directory at once is not
//! supported.

pub mod prompter;
pub mod session;

pub use prompter::{LogLevel, Prompter};
pub use session::{DetectedEnvironment, SessionConfig};

use crate::error::ProvisionError;
use crate::product::ProjectProfile;
use crate::release::{resolve_with_base, ArtifactTransport, HostPlatform, Installer};
use crate::runtime::validator::{managed_dir, MAIN_ASSEMBLY};
use crate::runtime::{self, CompatibilityFailure, CompatibilityResult, InstallCandidate};
use crate::templates::{
    self, derive_author_defaults, derived_default, SkeletonManifest, TemplateVariables,
    VariableKey,
};
use crate::vcs::{Git, GitSetup};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// How variables are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Ask for the author only, derive the rest, confirm once
    Quick,
    /// Prompt for every variable
    #[default]
    Interactive,
}

/// Wizard stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SelectInstall,
    ValidateCompatibility,
    CollectVariables,
    InstallFramework,
    Substitute,
    Cleanup,
    VersionControlSetup,
    Done,
}

/// Inputs fixed before the session starts
#[derive(Debug, Clone)]
pub struct WizardOptions {
    pub mode: Mode,
    /// Skeleton to convert
    pub project_dir: PathBuf,
    /// Game root or data directory; skips install selection when valid
    pub game_dir: Option<PathBuf>,
    pub author: Option<String>,
    /// Overrides the skeleton manifest and profile default
    pub framework_version: Option<String>,
    pub skip_install: bool,
    pub version_control: bool,
    pub host: HostPlatform,
    /// Steam roots scanned for install candidates
    pub steam_roots: Vec<PathBuf>,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            project_dir: PathBuf::from("."),
            game_dir: None,
            author: None,
            framework_version: None,
            skip_install: false,
            version_control: true,
            host: HostPlatform::current(),
            steam_roots: runtime::locate::default_steam_roots(),
        }
    }
}

/// What a completed session did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub rendered: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub framework_installed: bool,
    pub cleaned_up: bool,
    pub repository_created: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Completed(Summary),
    Cancelled,
}

/// Whether an error is a user cancellation
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::Cancelled)
    )
}

pub struct Wizard<C, P, T> {
    profile: C,
    prompter: P,
    installer: Installer<T>,
    options: WizardOptions,
}

impl<C: ProjectProfile, P: Prompter, T: ArtifactTransport> Wizard<C, P, T> {
    pub fn new(profile: C, prompter: P, transport: T, options: WizardOptions) -> Self {
        Self {
            profile,
            prompter,
            installer: Installer::new(transport),
            options,
        }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Run the whole session
    pub async fn run(&mut self) -> Result<Outcome> {
        match self.run_stages().await {
            Ok(summary) => Ok(Outcome::Completed(summary)),
            Err(e) if is_cancelled(&e) => Ok(Outcome::Cancelled),
            Err(e) => Err(e),
        }
    }

    async fn run_stages(&mut self) -> Result<Summary> {
        self.prompter.intro(self.profile.display_name())?;

        let manifest = SkeletonManifest::load(&self.options.project_dir)?;
        let framework_version = self
            .options
            .framework_version
            .clone()
            .or_else(|| manifest.framework_version.clone())
            .unwrap_or_else(|| self.profile.default_framework_version().to_string());
        let session = SessionConfig::new(
            self.options.project_dir.clone(),
            manifest,
            framework_version,
        );

        let environment = self.select_and_validate()?;
        let session = session.with_environment(environment);

        enter(Stage::CollectVariables);
        let variables = self.collect_variables(&session)?;
        let session = session.with_variables(variables);

        let mut summary = Summary::default();

        enter(Stage::InstallFramework);
        summary.framework_installed = self.install_framework(&session).await?;

        enter(Stage::Substitute);
        let (rendered, failed) = self.substitute(&session)?;
        summary.rendered = rendered;
        summary.failed = failed;

        enter(Stage::Cleanup);
        summary.cleaned_up = self.cleanup(&session, &summary.failed)?;

        enter(Stage::VersionControlSetup);
        summary.repository_created = self.setup_version_control(&session).await?;

        enter(Stage::Done);
        self.finish(&session)?;

        Ok(summary)
    }

    /// Pick an install and validate it, re-prompting while the path is not found
    fn select_and_validate(&mut self) -> Result<DetectedEnvironment> {
        let mut preset = self.options.game_dir.clone();

        loop {
            enter(Stage::SelectInstall);
            let candidate = match preset.take() {
                Some(path) => match runtime::resolve_manual(&path) {
                    Some(candidate) => candidate,
                    None => {
                        self.prompter.warning(&format!(
                            "No Unity game found at {}",
                            path.display()
                        ))?;
                        continue;
                    }
                },
                None => self.select_install()?,
            };

            enter(Stage::ValidateCompatibility);
            let result = runtime::validate(&candidate.data_dir);
            match result.failure_reason() {
                Some(CompatibilityFailure::NotFound) => {
                    self.prompter.warning(
                        &ProvisionError::NotFound(candidate.data_dir.clone()).to_string(),
                    )?;
                    continue;
                }
                Some(CompatibilityFailure::IncompatibleRuntime) => {
                    let err = ProvisionError::IncompatibleRuntime {
                        path: candidate.data_dir.clone(),
                    };
                    self.prompter.error(&err.to_string())?;
                    return Err(err.into());
                }
                _ => {}
            }

            let main_assembly = self.choose_assembly(&candidate, &result)?;
            let architecture = candidate
                .executable()
                .map(|exe| runtime::detect_architecture(&exe))
                .unwrap_or_default();
            let unity_version = runtime::detect_unity_version(&candidate.data_dir);

            self.prompter.success(&format!(
                "{}: Unity {} ({}), game assembly {}",
                candidate.display_name, unity_version, architecture, main_assembly
            ))?;

            return Ok(DetectedEnvironment {
                install: candidate,
                compatibility: result,
                main_assembly,
                architecture,
                unity_version,
            });
        }
    }

    fn select_install(&mut self) -> Result<InstallCandidate> {
        let candidates = runtime::find_installs(&self.options.steam_roots);

        if !candidates.is_empty() {
            let mut items: Vec<String> = candidates
                .iter()
                .map(|c| format!("{} ({})", c.display_name, c.root_dir.display()))
                .collect();
            items.push("Enter a path manually".to_string());

            let idx = self.prompter.select("Select the game to mod", &items)?;
            if let Some(candidate) = candidates.into_iter().nth(idx) {
                return Ok(candidate);
            }
        }

        loop {
            let input = self.prompter.input("Game install directory", "")?;
            let trimmed = input.trim().trim_matches('"');
            if trimmed.is_empty() {
                self.prompter.warning("Please enter the folder containing the game executable")?;
                continue;
            }
            match runtime::resolve_manual(Path::new(trimmed)) {
                Some(candidate) => return Ok(candidate),
                None => self
                    .prompter
                    .warning(&format!("No <Game>_Data folder found in {}", trimmed))?,
            }
        }
    }

    fn choose_assembly(
        &mut self,
        candidate: &InstallCandidate,
        result: &CompatibilityResult,
    ) -> Result<String> {
        if !result.needs_selection() {
            if let Some(main) = result.main_assembly() {
                return Ok(main.to_string());
            }
        }

        if !result.candidates().is_empty() {
            let idx = self
                .prompter
                .select("Which assembly holds the game code?", result.candidates())?;
            return result
                .candidates()
                .get(idx)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Invalid assembly selection"));
        }

        let err = ProvisionError::NoGameAssembly {
            path: managed_dir(&candidate.data_dir),
        };
        self.prompter.warning(&err.to_string())?;
        self.prompter.input("Game assembly file name", MAIN_ASSEMBLY)
    }

    fn collect_variables(&mut self, session: &SessionConfig) -> Result<TemplateVariables> {
        let seed = session.seed_variables();

        let seed = match self.options.mode {
            Mode::Quick => {
                let author = match self.options.author.clone() {
                    Some(author) => author,
                    None => self.prompter.input("Author name", "")?,
                };
                let vars = derive_author_defaults(seed, &author);
                self.prompter.info(&describe(&vars))?;

                if self.prompter.confirm("Use these settings?", true)? {
                    return Ok(vars);
                }
                self.prompter.info("Switching to interactive mode")?;
                vars
            }
            Mode::Interactive => match self.options.author.as_deref() {
                Some(author) => seed.with(VariableKey::Author, author.trim()),
                None => seed,
            },
        };

        let vars = self.prompt_each(&seed)?;
        self.prompter.info(&describe(&vars))?;
        if !self
            .prompter
            .confirm("Generate the project with these settings?", true)?
        {
            return Err(ProvisionError::Cancelled.into());
        }
        Ok(vars)
    }

    fn prompt_each(&mut self, seed: &TemplateVariables) -> Result<TemplateVariables> {
        let mut vars = TemplateVariables::new();
        for key in VariableKey::ALL {
            let default = seed
                .get(key)
                .map(str::to_string)
                .or_else(|| derived_default(key, &vars))
                .unwrap_or_default();
            let value = self.prompter.input(key.label(), &default)?;
            vars = vars.with(key, value.trim());
        }
        Ok(vars)
    }

    async fn install_framework(&mut self, session: &SessionConfig) -> Result<bool> {
        if self.options.skip_install {
            self.prompter.info("Skipping BepInEx installation")?;
            return Ok(false);
        }
        let Some(env) = &session.environment else {
            return Ok(false);
        };

        let version = session
            .variables
            .get(VariableKey::BepInExVersion)
            .unwrap_or(session.framework_version.as_str())
            .to_string();
        let release = resolve_with_base(
            &self.profile.release_base_url(),
            &version,
            self.options.host,
            env.architecture,
        );
        if let Some(advisory) = release.advisory {
            self.prompter.warning(&advisory.to_string())?;
        }

        let target = &env.install.root_dir;
        let already_installed = target.join("BepInEx").join("core").is_dir();
        let prompt = if already_installed {
            format!(
                "BepInEx is already installed in {}. Reinstall {}?",
                target.display(),
                version
            )
        } else {
            format!(
                "Install BepInEx {} ({}) into {}?",
                version,
                release.file_name,
                target.display()
            )
        };
        if !self.prompter.confirm(&prompt, !already_installed)? {
            self.prompter.info("Skipping BepInEx installation")?;
            return Ok(false);
        }

        self.prompter
            .start_task(&format!("Downloading {}", release.download_url))?;
        let result = self.installer.install(&release, target).await;
        self.prompter.finish_task(if result.is_ok() {
            "Download complete"
        } else {
            "Download failed"
        })?;

        match result {
            Ok(report) => {
                self.prompter.success(&format!(
                    "Installed BepInEx {} ({} files)",
                    version, report.files_extracted
                ))?;
                Ok(true)
            }
            Err(e) => {
                self.prompter.warning(&e.to_string())?;
                self.prompter.info(&format!(
                    "Install BepInEx manually: download {} and extract it into {}. See {}",
                    release.download_url,
                    target.display(),
                    self.profile.manual_install_url()
                ))?;
                Ok(false)
            }
        }
    }

    fn substitute(&mut self, session: &SessionConfig) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let marker = &session.manifest.template_marker;
        let missing = session.variables.missing();
        if !missing.is_empty() {
            tracing::debug!(?missing, "variables without a value");
        }
        let outcomes = templates::render_tree(&session.project_dir, marker, &session.variables);

        if outcomes.is_empty() {
            self.prompter.warning(&format!(
                "No *{} files found in {}",
                marker,
                session.project_dir.display()
            ))?;
        }

        let mut rendered = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(stats) => {
                    if !stats.unresolved.is_empty() {
                        tracing::info!(
                            file = %outcome.output.display(),
                            unresolved = ?stats.unresolved,
                            "placeholders left as-is"
                        );
                    }
                    rendered.push(outcome.output);
                }
                Err(e) => {
                    self.prompter.warning(&e.to_string())?;
                    failed.push(outcome.template);
                }
            }
        }

        if failed.is_empty() {
            self.prompter
                .success(&format!("Generated {} file(s)", rendered.len()))?;
        } else {
            self.prompter.warning(&format!(
                "Generated {} file(s); {} template(s) need manual editing",
                rendered.len(),
                failed.len()
            ))?;
        }

        Ok((rendered, failed))
    }

    /// Remove rendered templates and the plan file; failed templates are kept
    fn cleanup(&mut self, session: &SessionConfig, failed: &[PathBuf]) -> Result<bool> {
        let marker = &session.manifest.template_marker;
        let plan_file = &session.manifest.plan_file;
        let targets = templates::cleanup_targets(&session.project_dir, marker, plan_file, failed);
        if targets.is_empty() {
            return Ok(false);
        }

        let prompt = format!(
            "Remove {} template file(s) and {}?",
            targets.len(),
            plan_file
        );
        if !self.prompter.confirm(&prompt, failed.is_empty())? {
            return Ok(false);
        }

        let report = templates::cleanup(&session.project_dir, marker, plan_file, failed);
        for (path, e) in &report.failed {
            self.prompter
                .warning(&format!("Could not remove {}: {}", path.display(), e))?;
        }
        self.prompter
            .success(&format!("Removed {} file(s)", report.removed.len()))?;
        Ok(report.failed.is_empty())
    }

    async fn setup_version_control(&mut self, session: &SessionConfig) -> Result<bool> {
        if !self.options.version_control {
            return Ok(false);
        }

        let git = Git::new(&session.project_dir);
        if !git.is_available() {
            self.prompter
                .info("git not found, skipping repository setup")?;
            return Ok(false);
        }
        if !self
            .prompter
            .confirm("Initialize a git repository?", !git.is_repository())?
        {
            return Ok(false);
        }

        let remote = self
            .prompter
            .input("Remote URL (leave empty to skip)", "")?;
        let setup = GitSetup {
            remote_url: Some(remote).filter(|r| !r.trim().is_empty()),
            ..GitSetup::default()
        };

        match git.bootstrap(&setup).await {
            Ok(()) => {
                self.prompter.success("Created initial commit")?;
                Ok(true)
            }
            Err(e) => {
                self.prompter
                    .warning(&format!("Git setup failed: {:#}", e))?;
                Ok(false)
            }
        }
    }

    fn finish(&mut self, session: &SessionConfig) -> Result<()> {
        let steps = self
            .profile
            .next_steps(&session.project_dir, &session.variables);
        if !steps.is_empty() {
            let lines: Vec<String> = steps
                .iter()
                .enumerate()
                .map(|(i, step)| format!("{}.  {}", i + 1, step))
                .collect();
            self.prompter
                .info(&format!("Next steps\n{}", lines.join("\n")))?;
        }
        self.prompter.outro("Happy modding!")
    }
}

fn enter(stage: Stage) {
    tracing::info!(?stage, "wizard stage");
}

/// One `KEY = value` line per collected variable
fn describe(vars: &TemplateVariables) -> String {
    vars.iter()
        .map(|(key, value)| format!("{} = {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
