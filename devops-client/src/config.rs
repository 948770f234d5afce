//! Client configuration.
//!
//! Provides the account, credential and timeout settings for a `DevOpsClient`.
//! Configuration is either built explicitly or loaded from environment variables
//! with sensible defaults; nothing is read from process-wide state after the client
//! has been constructed.

use devops_model::LicenseKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryConfig;

/// Process template used for new projects unless configured otherwise.
pub const DEFAULT_PROJECT_TEMPLATE_ID: &str = "24a1e994-d40e-4e78-804d-8fa89c4e6c1d";

/// Name of the project collection addressed under the instance URL.
pub const DEFAULT_COLLECTION: &str = "DefaultCollection";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Client configuration for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account name, the `{account}` in `https://{account}.visualstudio.com/`.
    pub account: String,

    /// Instance URL override. Derived from the account when absent.
    pub instance_url: Option<String>,

    /// Personal access token sent as the basic-auth password.
    #[serde(skip_serializing)]
    pub personal_access_token: Option<String>,

    /// Process template id for new projects.
    pub project_template_id: String,

    /// License assigned when a caller does not pick one.
    pub default_license: LicenseKind,

    /// Prefix for generated service endpoint names.
    pub endpoint_prefix: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Lookups attempted after provisioning a bind-pending identity.
    pub provision_attempts: u32,

    /// Delay before the second post-provisioning lookup, in milliseconds.
    pub provision_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            instance_url: None,
            personal_access_token: None,
            project_template_id: DEFAULT_PROJECT_TEMPLATE_ID.to_string(),
            default_license: LicenseKind::Basic,
            endpoint_prefix: "Import".to_string(),
            timeout_secs: 30,
            provision_attempts: 5,
            provision_delay_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Configuration for an account authenticated with a personal access token.
    pub fn for_account(account: impl Into<String>, personal_access_token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            personal_access_token: Some(personal_access_token.into()),
            ..Self::default()
        }
    }

    /// Point the client at a different instance (e.g. an on-premises server or a mock).
    pub fn with_instance_url(mut self, instance_url: impl Into<String>) -> Self {
        self.instance_url = Some(instance_url.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DEVOPS_ACCOUNT`: Account name
    /// - `DEVOPS_PERSONAL_ACCESS_TOKEN`: Personal access token
    /// - `DEVOPS_INSTANCE_URL`: Instance URL override
    /// - `DEVOPS_PROJECT_TEMPLATE_ID`: Process template for new projects
    /// - `DEVOPS_DEFAULT_LICENSE`: Default license kind (unknown names fall back to basic)
    /// - `DEVOPS_ENDPOINT_PREFIX`: Service endpoint name prefix (default: Import)
    /// - `DEVOPS_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
    /// - `DEVOPS_PROVISION_ATTEMPTS`: Post-provisioning lookups (default: 5)
    /// - `DEVOPS_PROVISION_DELAY_MS`: Initial delay between those lookups (default: 500)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            account: std::env::var("DEVOPS_ACCOUNT").unwrap_or(default.account),
            instance_url: std::env::var("DEVOPS_INSTANCE_URL").ok(),
            personal_access_token: std::env::var("DEVOPS_PERSONAL_ACCESS_TOKEN").ok(),
            project_template_id: std::env::var("DEVOPS_PROJECT_TEMPLATE_ID")
                .unwrap_or(default.project_template_id),
            default_license: std::env::var("DEVOPS_DEFAULT_LICENSE")
                .map(|s| LicenseKind::parse_or_basic(&s))
                .unwrap_or(default.default_license),
            endpoint_prefix: std::env::var("DEVOPS_ENDPOINT_PREFIX").unwrap_or(default.endpoint_prefix),
            timeout_secs: std::env::var("DEVOPS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            provision_attempts: std::env::var("DEVOPS_PROVISION_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.provision_attempts),
            provision_delay_ms: std::env::var("DEVOPS_PROVISION_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.provision_delay_ms),
        }
    }

    /// Validate that the configuration can authenticate against an account.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("DEVOPS_ACCOUNT".to_string()));
        }
        match self.personal_access_token.as_deref() {
            None | Some("") => {
                return Err(ConfigError::MissingEnvVar(
                    "DEVOPS_PERSONAL_ACCESS_TOKEN".to_string(),
                ))
            }
            Some(_) => {}
        }
        if self.provision_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DEVOPS_PROVISION_ATTEMPTS".to_string(),
                message: "at least one lookup is required".to_string(),
            });
        }
        Ok(())
    }

    /// Instance URL, always ending in `/`.
    pub fn instance_url(&self) -> String {
        match &self.instance_url {
            Some(url) => format!("{}/", url.trim_end_matches('/')),
            None => format!("https://{}.visualstudio.com/", self.account),
        }
    }

    /// Project collection URL.
    pub fn collection_url(&self) -> String {
        format!("{}{}", self.instance_url(), DEFAULT_COLLECTION)
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff used while waiting for a provisioned identity to become visible.
    pub fn provisioning_retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.provision_attempts.max(1),
            initial_delay: Duration::from_millis(self.provision_delay_ms),
            ..RetryConfig::default()
        }
    }

    /// Credentials built from the configured token.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.personal_access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(Credentials::personal_access_token)
            .ok_or_else(|| ConfigError::MissingEnvVar("DEVOPS_PERSONAL_ACCESS_TOKEN".to_string()))
    }
}

/// Basic-auth credentials applied to every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username half, empty for token authentication.
    pub username: String,

    /// Password half.
    pub token: String,
}

impl Credentials {
    /// Token credentials: empty username, token as password.
    pub fn personal_access_token(token: &str) -> Self {
        Self {
            username: String::new(),
            token: token.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.provision_attempts, 5);
        assert_eq!(config.default_license, LicenseKind::Basic);
        assert_eq!(config.project_template_id, DEFAULT_PROJECT_TEMPLATE_ID);
    }

    #[test]
    fn test_urls_derived_from_account() {
        let config = ClientConfig::for_account("agilefactory", "pat");
        assert_eq!(config.instance_url(), "https://agilefactory.visualstudio.com/");
        assert_eq!(
            config.collection_url(),
            "https://agilefactory.visualstudio.com/DefaultCollection"
        );
    }

    #[test]
    fn test_instance_url_override() {
        let config = ClientConfig::for_account("x", "pat").with_instance_url("http://127.0.0.1:8080");
        assert_eq!(config.instance_url(), "http://127.0.0.1:8080/");
        assert_eq!(config.collection_url(), "http://127.0.0.1:8080/DefaultCollection");

        let config = ClientConfig::for_account("x", "pat").with_instance_url("http://tfs.local/");
        assert_eq!(config.instance_url(), "http://tfs.local/");
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_err());
        assert!(ClientConfig::for_account("acct", "").validate().is_err());
        assert!(ClientConfig::for_account("acct", "pat").validate().is_ok());

        let mut config = ClientConfig::for_account("acct", "pat");
        config.provision_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_credentials_use_empty_username() {
        let credentials = ClientConfig::for_account("acct", "pat").credentials().unwrap();
        assert_eq!(credentials.username, "");
        assert_eq!(credentials.token, "pat");
        assert!(format!("{:?}", credentials).contains("<redacted>"));

        assert!(ClientConfig::default().credentials().is_err());
    }

    #[test]
    fn test_provisioning_retry() {
        let mut config = ClientConfig::for_account("acct", "pat");
        config.provision_attempts = 3;
        config.provision_delay_ms = 50;

        let retry = config.provisioning_retry();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        std::env::set_var("DEVOPS_ACCOUNT", "fabrikam");
        std::env::set_var("DEVOPS_PERSONAL_ACCESS_TOKEN", "env-pat");
        std::env::set_var("DEVOPS_DEFAULT_LICENSE", "stakeholder");
        std::env::set_var("DEVOPS_TIMEOUT_SECS", "not-a-number");

        let config = ClientConfig::from_env();
        assert_eq!(config.account, "fabrikam");
        assert_eq!(config.personal_access_token.as_deref(), Some("env-pat"));
        assert_eq!(config.default_license, LicenseKind::Stakeholder);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());

        std::env::set_var("DEVOPS_DEFAULT_LICENSE", "platinum");
        assert_eq!(ClientConfig::from_env().default_license, LicenseKind::Basic);

        for key in [
            "DEVOPS_ACCOUNT",
            "DEVOPS_PERSONAL_ACCESS_TOKEN",
            "DEVOPS_DEFAULT_LICENSE",
            "DEVOPS_TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
    }
}
