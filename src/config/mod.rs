use crate::constants::{self, env_vars, retry};
use crate::data_fetcher::api::RetryPolicy;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod organizations;
pub mod paths;
pub mod validation;

pub use organizations::{Organization, load_organizations, parse_organizations};
use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing run settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// API domain for fetching match data. Should include https:// prefix.
    pub api_domain: String,
    /// JSON file mapping organization names to their ids.
    pub organizations_file: String,
    /// Directory the yearly snapshot is written to.
    pub output_dir: String,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// Timeout of a single HTTP attempt in seconds.
    pub http_timeout_seconds: u64,
    /// Attempts per request, including the first one.
    pub max_retries: u32,
    /// Backoff unit in seconds used between retried attempts.
    pub retry_delay_seconds: u64,
    /// Pause between two organizations in seconds.
    pub request_delay_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_domain: constants::DEFAULT_API_DOMAIN.to_string(),
            organizations_file: constants::DEFAULT_ORGANIZATIONS_FILE.to_string(),
            output_dir: constants::DEFAULT_OUTPUT_DIR.to_string(),
            log_file_path: None,
            http_timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
            max_retries: retry::MAX_ATTEMPTS,
            retry_delay_seconds: retry::BACKOFF_UNIT_SECONDS,
            request_delay_seconds: retry::REQUEST_DELAY_SECONDS,
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// A missing config file is not an error: defaults are used instead.
    /// Environment variables override config file values.
    ///
    /// # Environment Variables
    /// - `BSM_API_DOMAIN` - Override API domain
    /// - `BSM_LOG_FILE` - Override log file path
    /// - `BSM_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `BSM_ORGANIZATIONS_FILE` - Override organizations file
    /// - `BSM_OUTPUT_DIR` - Override snapshot directory
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Applies `BSM_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_domain) = std::env::var(env_vars::API_DOMAIN) {
            self.api_domain = api_domain;
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }

        if let Ok(organizations_file) = std::env::var(env_vars::ORGANIZATIONS_FILE) {
            self.organizations_file = organizations_file;
        }

        if let Ok(output_dir) = std::env::var(env_vars::OUTPUT_DIR) {
            self.output_dir = output_dir;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Retry budget and backoff unit for the fetcher.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_secs(self.retry_delay_seconds),
        )
    }

    /// API domain with a scheme; bare domains default to https.
    pub fn api_base_url(&self) -> String {
        if self.api_domain.starts_with("http://") || self.api_domain.starts_with("https://") {
            self.api_domain.clone()
        } else {
            format!("https://{}", self.api_domain)
        }
    }

    /// Pause applied between two organizations.
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_seconds)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();
        let config = Config::load().await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        if Path::new(&config_path).exists() {
            println!("{config_path}");
        } else {
            println!("{config_path} (not found, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("API Domain:");
        println!("{}", config.api_domain);
        println!("────────────────────────────────────");
        println!("Organizations File:");
        println!("{}", config.organizations_file);
        println!("────────────────────────────────────");
        println!("Output Directory:");
        println!("{}", config.output_dir);
        println!("────────────────────────────────────");
        println!("HTTP Timeout / Retries / Backoff / Request Delay:");
        println!(
            "{}s / {} / {}s / {}s",
            config.http_timeout_seconds,
            config.max_retries,
            config.retry_delay_seconds,
            config.request_delay_seconds
        );
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/{}", constants::LOG_FILE_NAME);
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist. A bare domain gets
    /// the https:// prefix; an explicit scheme is kept as given.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(&Config {
            api_domain: self.api_base_url(),
            ..self.clone()
        })?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_load_existing_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_path_str = config_path.to_string_lossy();

        let config_content = r#"
api_domain = "https://api.example.com"
organizations_file = "/etc/bsm/organizations.json"
log_file_path = "/custom/log/path"
max_retries = 5
"#;
        tokio::fs::write(&config_path, config_content)
            .await
            .unwrap();

        let config = Config::load_from_path(&config_path_str).await.unwrap();

        assert_eq!(config.api_domain, "https://api.example.com");
        assert_eq!(config.organizations_file, "/etc/bsm/organizations.json");
        assert_eq!(config.log_file_path, Some("/custom/log/path".to_string()));
        assert_eq!(config.max_retries, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.output_dir, "data");
        assert_eq!(config.retry_delay_seconds, 10);
        assert_eq!(config.request_delay_seconds, 2);
        assert_eq!(config.http_timeout_seconds, 30);
    }

    #[tokio::test]
    async fn test_config_load_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(&config_path, "api_domain = [broken")
            .await
            .unwrap();

        let result = Config::load_from_path(&config_path.to_string_lossy()).await;
        assert!(matches!(result, Err(AppError::TomlDeserialize(_))));
    }

    #[tokio::test]
    async fn test_config_save_and_reload() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        let config_path_str = config_path.to_string_lossy();
        let config = Config {
            api_domain: "api.example.com".to_string(),
            log_file_path: Some("/custom/log/path".to_string()),
            request_delay_seconds: 0,
            ..Config::default()
        };
        config.save_to_path(&config_path_str).await.unwrap();
        assert!(config_path.exists());

        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert!(
            content.contains("https://api.example.com"),
            "Bare domain should be saved with https. Content: {content}"
        );

        let loaded = Config::load_from_path(&config_path_str).await.unwrap();
        assert_eq!(loaded.api_domain, "https://api.example.com");
        assert_eq!(loaded.log_file_path, Some("/custom/log/path".to_string()));
        assert_eq!(loaded.request_delay_seconds, 0);
    }

    #[tokio::test]
    async fn test_save_keeps_explicit_http_scheme() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let config_path_str = config_path.to_string_lossy();
        let config = Config {
            api_domain: "http://localhost:8080".to_string(),
            ..Config::default()
        };

        config.save_to_path(&config_path_str).await.unwrap();

        let loaded = Config::load_from_path(&config_path_str).await.unwrap();
        assert_eq!(loaded.api_domain, "http://localhost:8080");
    }

    #[test]
    fn test_api_base_url() {
        let with_scheme = |domain: &str| {
            Config {
                api_domain: domain.to_string(),
                ..Config::default()
            }
            .api_base_url()
        };
        assert_eq!(with_scheme("bsm.example.de"), "https://bsm.example.de");
        assert_eq!(with_scheme("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(with_scheme("https://bsm.example.de"), "https://bsm.example.de");
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = Config {
            max_retries: 4,
            retry_delay_seconds: 7,
            request_delay_seconds: 1,
            ..Config::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.backoff_unit(), Duration::from_secs(7));
        assert_eq!(config.request_delay(), Duration::from_secs(1));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        unsafe {
            std::env::set_var(env_vars::API_DOMAIN, "https://env.example.com");
            std::env::set_var(env_vars::HTTP_TIMEOUT, "12");
            std::env::set_var(env_vars::OUTPUT_DIR, "/tmp/bsm-out");
            std::env::set_var(env_vars::ORGANIZATIONS_FILE, "/tmp/orgs.json");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        unsafe {
            std::env::remove_var(env_vars::API_DOMAIN);
            std::env::remove_var(env_vars::HTTP_TIMEOUT);
            std::env::remove_var(env_vars::OUTPUT_DIR);
            std::env::remove_var(env_vars::ORGANIZATIONS_FILE);
        }

        assert_eq!(config.api_domain, "https://env.example.com");
        assert_eq!(config.http_timeout_seconds, 12);
        assert_eq!(config.output_dir, "/tmp/bsm-out");
        assert_eq!(config.organizations_file, "/tmp/orgs.json");
    }

    #[test]
    #[serial]
    fn test_env_override_ignores_unparsable_timeout() {
        unsafe {
            std::env::set_var(env_vars::HTTP_TIMEOUT, "soon");
        }
        let mut config = Config::default();
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var(env_vars::HTTP_TIMEOUT);
        }
        assert_eq!(config.http_timeout_seconds, 30);
    }
}
