//! Plugin Scaffold Core - turn a generic plugin skeleton into a game-specific workspace
//!
//! The library inspects a Unity game installation, installs a matching BepInEx
//! release into it, and rewrites the `.template` files of a plugin skeleton
//! with values gathered from detection and from the user.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Binary inspection, runtime validation,
//!   release resolution, installation and template substitution
//! - **Layer 2: Workflow Orchestration** - `ProjectProfile` trait and the
//!   staged `Wizard`, driven through the `Prompter` seam
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompter and `run`
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use plugin_scaffold_core::{runtime, release};
//!
//! let result = runtime::validate(game_data_dir);
//! if result.is_compatible() {
//!     let arch = runtime::detect_architecture(&game_exe);
//!     let asset = release::resolve("5.4.22", release::HostPlatform::current(), arch);
//!     println!("{}", asset.download_url);
//! }
//! ```

pub mod error;
pub mod product;
pub mod release;
pub mod runtime;
pub mod templates;
pub mod vcs;
pub mod wizard;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::{ProvisionError, Result};
pub use product::ProjectProfile;
pub use release::{resolve, ArtifactTransport, HostPlatform, Installer, ReleaseDescriptor};
pub use runtime::{detect_architecture, validate, Architecture, CompatibilityResult};
pub use templates::{render_tree, substitute, TemplateVariables, VariableKey};
pub use wizard::{Mode, Outcome, Prompter, Summary, Wizard, WizardOptions};

#[cfg(feature = "tui")]
pub use tui::run;
