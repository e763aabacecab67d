//! Skeleton manifest (`scaffold.yaml`) types and parsing

use super::cleanup::is_plain_file_name;
use super::engine::TEMPLATE_MARKER;
use super::variables::{TemplateVariables, VariableKey};
use crate::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the optional manifest at the skeleton root
pub const MANIFEST_FILE: &str = "scaffold.yaml";

/// Plan file removed during cleanup when the manifest does not name one
pub const DEFAULT_PLAN_FILE: &str = "PLAN.md";

/// Per-skeleton settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonManifest {
    /// Suffix marking template files
    #[serde(default = "default_marker")]
    pub template_marker: String,

    /// Planning document deleted together with the templates during cleanup
    #[serde(default = "default_plan_file")]
    pub plan_file: String,

    /// BepInEx version this skeleton targets
    #[serde(default)]
    pub framework_version: Option<String>,

    /// Default values keyed by template identifier (`PLUGIN_VERSION: 0.1.0`)
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

fn default_marker() -> String {
    TEMPLATE_MARKER.to_string()
}

fn default_plan_file() -> String {
    DEFAULT_PLAN_FILE.to_string()
}

impl Default for SkeletonManifest {
    fn default() -> Self {
        Self {
            template_marker: default_marker(),
            plan_file: default_plan_file(),
            framework_version: None,
            defaults: BTreeMap::new(),
        }
    }
}

impl SkeletonManifest {
    /// Load `scaffold.yaml` from `root`, or defaults when it is absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let manifest: SkeletonManifest =
            serde_yaml::from_str(&content).map_err(|e| ProvisionError::Manifest {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if manifest.template_marker.is_empty() {
            return Err(ProvisionError::Manifest {
                path,
                reason: "template_marker must not be empty".to_string(),
            });
        }
        if !is_plain_file_name(&manifest.plan_file) {
            return Err(ProvisionError::Manifest {
                path,
                reason: format!(
                    "plan_file '{}' must be a file name inside the skeleton root",
                    manifest.plan_file
                ),
            });
        }
        Ok(manifest)
    }

    /// Defaults as variables; unknown identifiers are skipped with a warning
    pub fn default_variables(&self) -> TemplateVariables {
        self.defaults
            .iter()
            .fold(TemplateVariables::new(), |vars, (name, value)| {
                match name.parse::<VariableKey>() {
                    Ok(key) => vars.with(key, value.clone()),
                    Err(e) => {
                        tracing::warn!("{} in {}", e, MANIFEST_FILE);
                        vars
                    }
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_manifest_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = SkeletonManifest::load(dir.path()).unwrap();
        assert_eq!(manifest, SkeletonManifest::default());
        assert_eq!(manifest.template_marker, ".template");
        assert_eq!(manifest.plan_file, "PLAN.md");
    }

    #[test]
    fn test_parse_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"
template_marker: .tmpl
framework_version: "5.4.21"
defaults:
  PLUGIN_VERSION: 0.1.0
  NOT_A_KEY: ignored
"#,
        )
        .unwrap();

        let manifest = SkeletonManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.template_marker, ".tmpl");
        assert_eq!(manifest.plan_file, "PLAN.md");
        assert_eq!(manifest.framework_version.as_deref(), Some("5.4.21"));

        let vars = manifest.default_variables();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get(VariableKey::PluginVersion), Some("0.1.0"));
    }

    #[test]
    fn test_invalid_manifest_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "template_marker: [").unwrap();
        assert!(matches!(
            SkeletonManifest::load(dir.path()),
            Err(ProvisionError::Manifest { .. })
        ));

        std::fs::write(dir.path().join(MANIFEST_FILE), "template_marker: \"\"").unwrap();
        assert!(SkeletonManifest::load(dir.path()).is_err());
    }

    #[test]
    fn test_plan_file_must_stay_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("outside.txt").display().to_string();

        for plan_file in ["../outside.txt", absolute.as_str(), "docs/PLAN.md"] {
            let yaml = serde_yaml::to_string(&SkeletonManifest {
                plan_file: plan_file.to_string(),
                ..SkeletonManifest::default()
            })
            .unwrap();
            std::fs::write(dir.path().join(MANIFEST_FILE), yaml).unwrap();

            assert!(
                matches!(
                    SkeletonManifest::load(dir.path()),
                    Err(ProvisionError::Manifest { .. })
                ),
                "{} was accepted",
                plan_file
            );
        }
    }

    #[test]
    fn test_bundled_skeleton_manifest() {
        let content = include_str!("../../../../templates/bepinex-plugin/scaffold.yaml");
        let manifest: SkeletonManifest = serde_yaml::from_str(content).unwrap();

        assert_eq!(manifest.template_marker, TEMPLATE_MARKER);
        assert_eq!(manifest.framework_version.as_deref(), Some("5.4.23.2"));
        assert_eq!(manifest.default_variables().len(), manifest.defaults.len());
    }
}
