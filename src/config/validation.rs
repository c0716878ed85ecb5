use super::Config;
use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API domain cannot be empty and must look like a URL or domain name
/// - At least one attempt per request
/// - HTTP timeout must be positive
/// - Organizations file and output directory cannot be empty
/// - If log file path is provided, it cannot be empty and its parent must be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    let api_domain = config.api_domain.as_str();
    if api_domain.is_empty() {
        return Err(AppError::config_error("API domain cannot be empty"));
    }

    if !api_domain.starts_with("http://") && !api_domain.starts_with("https://") {
        // Without a scheme it should at least look like a domain
        if !api_domain.contains('.') && !api_domain.starts_with("localhost") {
            return Err(AppError::config_error(
                "API domain must be a valid URL or domain name",
            ));
        }
    }

    if config.max_retries == 0 {
        return Err(AppError::config_error(
            "max_retries must allow at least one attempt",
        ));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "http_timeout_seconds must be greater than zero",
        ));
    }

    if config.organizations_file.trim().is_empty() {
        return Err(AppError::config_error("Organizations file cannot be empty"));
    }

    if config.output_dir.trim().is_empty() {
        return Err(AppError::config_error("Output directory cannot be empty"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
