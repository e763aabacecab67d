//! Configuration handed from one wizard stage to the next

use crate::runtime::engine::short_version;
use crate::runtime::{Architecture, CompatibilityResult, InstallCandidate};
use crate::templates::{SkeletonManifest, TemplateVariables, VariableKey};
use std::path::PathBuf;

/// Facts gathered about the selected game installation
#[derive(Debug, Clone)]
pub struct DetectedEnvironment {
    pub install: InstallCandidate,
    pub compatibility: CompatibilityResult,
    pub main_assembly: String,
    pub architecture: Architecture,
    pub unity_version: String,
}

impl DetectedEnvironment {
    /// Template variables that follow directly from detection
    pub fn variables(&self, framework_version: &str) -> TemplateVariables {
        let exe = self
            .install
            .executable()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        TemplateVariables::new()
            .with(VariableKey::GameName, self.install.display_name.clone())
            .with(VariableKey::GameExe, exe)
            .with(
                VariableKey::GamePath,
                self.install.root_dir.display().to_string(),
            )
            .with(
                VariableKey::ManagedPath,
                crate::runtime::validator::managed_dir(&self.install.data_dir)
                    .display()
                    .to_string(),
            )
            .with(
                VariableKey::UnityVersion,
                short_version(&self.unity_version),
            )
            .with(VariableKey::Architecture, self.architecture.as_str())
            .with(VariableKey::MainAssembly, self.main_assembly.clone())
            .with(VariableKey::BepInExVersion, framework_version)
    }
}

/// Session state, rebuilt (never mutated in place) at each stage
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub project_dir: PathBuf,
    pub manifest: SkeletonManifest,
    pub framework_version: String,
    pub environment: Option<DetectedEnvironment>,
    pub variables: TemplateVariables,
}

impl SessionConfig {
    pub fn new(project_dir: PathBuf, manifest: SkeletonManifest, framework_version: String) -> Self {
        Self {
            project_dir,
            manifest,
            framework_version,
            environment: None,
            variables: TemplateVariables::new(),
        }
    }

    pub fn with_environment(self, environment: DetectedEnvironment) -> Self {
        Self {
            environment: Some(environment),
            ..self
        }
    }

    pub fn with_variables(self, variables: TemplateVariables) -> Self {
        Self { variables, ..self }
    }

    /// Skeleton defaults overlaid with detected values
    pub fn seed_variables(&self) -> TemplateVariables {
        let defaults = self.manifest.default_variables();
        match &self.environment {
            Some(env) => defaults.merged(&env.variables(&self.framework_version)),
            None => defaults.with(VariableKey::BepInExVersion, self.framework_version.clone()),
        }
    }
}
