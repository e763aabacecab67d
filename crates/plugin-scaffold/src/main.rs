//! plugin-scaffold CLI - turn a BepInEx plugin skeleton into a game-specific workspace

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use plugin_scaffold_core::templates::{TemplateVariables, VariableKey};
use plugin_scaffold_core::wizard::{Mode, Outcome, WizardOptions};
use plugin_scaffold_core::{ProjectProfile, ProvisionError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// BepInEx version installed when nothing else names one
pub const DEFAULT_FRAMEWORK_VERSION: &str = "5.4.23.2";

/// plugin-scaffold profile
#[derive(Clone)]
pub struct PluginScaffoldProfile;

impl ProjectProfile for PluginScaffoldProfile {
    fn name(&self) -> &'static str {
        "plugin-scaffold"
    }

    fn display_name(&self) -> &'static str {
        "BepInEx Plugin Scaffold"
    }

    fn default_framework_version(&self) -> &'static str {
        DEFAULT_FRAMEWORK_VERSION
    }

    fn release_url_env(&self) -> &'static str {
        "PLUGIN_SCAFFOLD_RELEASE_URL"
    }

    fn download_timeout_env(&self) -> &'static str {
        "PLUGIN_SCAFFOLD_DOWNLOAD_TIMEOUT"
    }

    fn manual_install_url(&self) -> &'static str {
        "https://docs.bepinex.dev/articles/user_guide/installation/index.html"
    }

    fn next_steps(&self, project_dir: &Path, vars: &TemplateVariables) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(project_dir) {
            steps.push(format!("cd {}", project_dir.display()));
        }

        steps.push("dotnet build".to_string());

        if let Some(game_path) = vars.get(VariableKey::GamePath) {
            steps.push(format!(
                "Copy the built DLL into {}",
                Path::new(game_path).join("BepInEx").join("plugins").display()
            ));
        }
        if let Some(exe) = vars.get(VariableKey::GameExe).filter(|e| !e.is_empty()) {
            steps.push(format!("Launch {} and check BepInEx/LogOutput.log", exe));
        }

        steps
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Ask for the author only and derive everything else
    Quick,
}

#[derive(Parser, Debug)]
#[command(name = "plugin-scaffold")]
#[command(about = "Turn a BepInEx plugin skeleton into a game-specific workspace")]
#[command(version)]
pub struct Args {
    /// Run in quick mode (same as --quick)
    #[arg(value_enum)]
    pub mode: Option<ModeArg>,

    /// Quick mode: ask for the author only and derive everything else
    #[arg(short, long)]
    pub quick: bool,

    /// Plugin author
    #[arg(short, long)]
    pub author: Option<String>,

    /// Skeleton directory to convert
    #[arg(short = 'd', long = "project-dir", default_value = ".")]
    pub project_dir: PathBuf,

    /// Game install (root or <Game>_Data directory); skips install selection
    #[arg(short, long = "game-dir")]
    pub game_dir: Option<PathBuf>,

    /// BepInEx version to install
    #[arg(long = "framework-version", env = "PLUGIN_SCAFFOLD_FRAMEWORK_VERSION")]
    pub framework_version: Option<String>,

    /// Do not download or install BepInEx
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Skip git repository setup
    #[arg(long = "no-git")]
    pub no_git: bool,

    /// Open the BepInEx installation guide in the browser and exit
    #[arg(long)]
    pub guide: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    fn wizard_options(&self) -> WizardOptions {
        let mode = if self.quick || self.mode == Some(ModeArg::Quick) {
            Mode::Quick
        } else {
            Mode::Interactive
        };

        WizardOptions {
            mode,
            project_dir: self.project_dir.clone(),
            game_dir: self.game_dir.clone(),
            author: self.author.clone(),
            framework_version: self.framework_version.clone(),
            skip_install: self.skip_install,
            version_control: !self.no_git,
            ..WizardOptions::default()
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(args: Args) -> Result<()> {
    let profile = PluginScaffoldProfile;

    if args.guide {
        open::that(profile.manual_install_url())
            .with_context(|| format!("Failed to open {}", profile.manual_install_url()))?;
        return Ok(());
    }

    let options = args.wizard_options();
    tracing::debug!(?options, "starting wizard");
    match plugin_scaffold_core::run(&profile, options).await? {
        Outcome::Completed(summary) => {
            tracing::debug!(?summary, "session completed");
        }
        Outcome::Cancelled => tracing::debug!("session cancelled"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let result = run(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err
                .downcast_ref::<ProvisionError>()
                .is_some_and(ProvisionError::is_fatal)
            {
                eprintln!("{} {}", "error:".red().bold(), err);
                eprintln!(
                    "{}",
                    "BepInEx 5 plugins need a Mono build of the game.".dimmed()
                );
            } else {
                eprintln!("{} {:#}", "error:".red().bold(), err);
            }
            ExitCode::FAILURE
        }
    }
}
