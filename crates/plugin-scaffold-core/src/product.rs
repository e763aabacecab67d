//! Project profile trait for CLI binaries
//!
//! A profile fixes the identity and defaults of a scaffolding binary: which
//! framework version it installs, where releases come from, and what the
//! user is told once the workspace is ready.

use crate::release::installer::DEFAULT_DOWNLOAD_TIMEOUT;
use crate::release::resolver::DEFAULT_RELEASE_BASE_URL;
use crate::templates::TemplateVariables;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration trait for scaffolding binaries
pub trait ProjectProfile: Clone + Send + Sync + 'static {
    /// Internal name (used for env vars and the user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// BepInEx version installed when neither the CLI nor the skeleton names one
    fn default_framework_version(&self) -> &'static str;

    /// Environment variable overriding the release download base URL
    fn release_url_env(&self) -> &'static str;

    /// Environment variable overriding the download timeout (seconds)
    fn download_timeout_env(&self) -> &'static str;

    /// Page explaining how to install the framework by hand
    fn manual_install_url(&self) -> &'static str;

    /// Instructions printed after the workspace is generated
    fn next_steps(&self, project_dir: &Path, vars: &TemplateVariables) -> Vec<String>;

    /// Base URL for release downloads.
    ///
    /// An override that does not parse as an http(s) URL is ignored.
    fn release_base_url(&self) -> String {
        let Ok(raw) = std::env::var(self.release_url_env()) else {
            return DEFAULT_RELEASE_BASE_URL.to_string();
        };

        match Url::parse(raw.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                url.as_str().trim_end_matches('/').to_string()
            }
            _ => {
                tracing::warn!(
                    var = self.release_url_env(),
                    value = %raw,
                    "ignoring invalid release URL override"
                );
                DEFAULT_RELEASE_BASE_URL.to_string()
            }
        }
    }

    /// Download timeout, overridable in whole seconds
    fn download_timeout(&self) -> Duration {
        std::env::var(self.download_timeout_env())
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT)
    }

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct EnvProfile;

    impl ProjectProfile for EnvProfile {
        fn name(&self) -> &'static str {
            "env-profile"
        }
        fn display_name(&self) -> &'static str {
            "Env Profile"
        }
        fn default_framework_version(&self) -> &'static str {
            "5.4.22"
        }
        fn release_url_env(&self) -> &'static str {
            "PRODUCT_TEST_RELEASE_URL"
        }
        fn download_timeout_env(&self) -> &'static str {
            "PRODUCT_TEST_DOWNLOAD_TIMEOUT"
        }
        fn manual_install_url(&self) -> &'static str {
            "https://example.com/install"
        }
        fn next_steps(&self, _project_dir: &Path, _vars: &TemplateVariables) -> Vec<String> {
            Vec::new()
        }
    }

    // Process env is shared across tests, keep every override in one place
    #[test]
    fn test_env_overrides() {
        let profile = EnvProfile;

        std::env::remove_var("PRODUCT_TEST_RELEASE_URL");
        assert_eq!(profile.release_base_url(), DEFAULT_RELEASE_BASE_URL);

        std::env::set_var("PRODUCT_TEST_RELEASE_URL", "https://mirror.example.com/bepinex/");
        assert_eq!(profile.release_base_url(), "https://mirror.example.com/bepinex");

        std::env::set_var("PRODUCT_TEST_RELEASE_URL", "not a url");
        assert_eq!(profile.release_base_url(), DEFAULT_RELEASE_BASE_URL);

        std::env::set_var("PRODUCT_TEST_DOWNLOAD_TIMEOUT", "15");
        assert_eq!(profile.download_timeout(), Duration::from_secs(15));

        std::env::set_var("PRODUCT_TEST_DOWNLOAD_TIMEOUT", "0");
        assert_eq!(profile.download_timeout(), DEFAULT_DOWNLOAD_TIMEOUT);
    }
}
