//! Template discovery, substitution and cleanup
//!
//! This module provides:
//! - Template variable keys and the incrementally built value map
//! - The substitution engine that renders `*.template` files in place
//! - The optional skeleton manifest (`scaffold.yaml`)
//! - Cleanup of template files and the plan document

pub mod cleanup;
pub mod engine;
pub mod manifest;
pub mod variables;

pub use cleanup::{cleanup, cleanup_targets, is_plain_file_name, CleanupReport};
pub use engine::{
    discover, output_path, render_file, render_tree, substitute, FileOutcome, RenderStats,
    TEMPLATE_MARKER,
};
pub use manifest::{SkeletonManifest, DEFAULT_PLAN_FILE, MANIFEST_FILE};
pub use variables::{derive_author_defaults, derived_default, TemplateVariables, VariableKey};
