use crate::cli::Args;
use crate::config::Config;
use crate::error::AppError;
use std::path::Path;

/// Oldest season the API has data for.
const MIN_SEASON: i32 = 1990;
/// Latest season accepted on the command line.
const MAX_SEASON: i32 = 2100;

/// Validates command line argument combinations.
///
/// Returns an error if incompatible arguments are used together.
pub fn validate_args(args: &Args) -> Result<(), AppError> {
    if args.list_config && args.init_config {
        return Err(AppError::config_error(
            "Cannot use both --list-config and --init-config",
        ));
    }

    if let Some(year) = args.year
        && !(MIN_SEASON..=MAX_SEASON).contains(&year)
    {
        return Err(AppError::config_error(format!(
            "Year {year} is outside the supported range {MIN_SEASON}-{MAX_SEASON}"
        )));
    }

    for (flag, value) in [
        ("--organizations", &args.organizations_file),
        ("--output-dir", &args.output_dir),
        ("--api-domain", &args.api_domain),
        ("--log-file", &args.log_file),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::config_error(format!("{flag} cannot be empty")));
        }
    }

    Ok(())
}

/// Applies command line values on top of the loaded configuration.
pub fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(organizations_file) = &args.organizations_file {
        config.organizations_file = organizations_file.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(api_domain) = &args.api_domain {
        config.api_domain = api_domain.clone();
    }
    if let Some(log_file) = &args.log_file {
        config.log_file_path = Some(log_file.clone());
    }
}

/// Handles the --list-config command.
///
/// Displays current configuration settings.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles the --init-config command.
///
/// Writes the effective configuration (file, environment and command line)
/// to the default location. An existing file is left untouched.
pub async fn handle_init_config_command(args: &Args) -> Result<(), AppError> {
    let config_path = Config::get_config_path();
    init_config_at(&config_path, args).await
}

async fn init_config_at(config_path: &str, args: &Args) -> Result<(), AppError> {
    if Path::new(config_path).exists() {
        println!("Config already exists at {config_path}");
        return Ok(());
    }

    let mut config = Config::default();
    config.apply_env_overrides();
    apply_cli_overrides(&mut config, args);
    config.validate()?;
    config.save_to_path(config_path).await?;

    println!("Config written to {config_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_validate_args_accepts_defaults() {
        assert!(validate_args(&Args::default()).is_ok());
    }

    #[test]
    fn test_validate_args_rejects_conflicting_config_flags() {
        let args = Args {
            list_config: true,
            init_config: true,
            ..Args::default()
        };
        assert!(matches!(validate_args(&args), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_args_year_range() {
        let args = Args {
            year: Some(1800),
            ..Args::default()
        };
        let err = validate_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let args = Args {
            year: Some(2025),
            ..Args::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_rejects_blank_paths() {
        let args = Args {
            output_dir: Some("  ".to_string()),
            ..Args::default()
        };
        let err = validate_args(&args).unwrap_err();
        assert!(err.to_string().contains("--output-dir"));
    }

    #[test]
    fn test_cli_overrides_replace_config_values() {
        let mut config = Config::default();
        let args = Args {
            organizations_file: Some("orgs.json".to_string()),
            output_dir: Some("out".to_string()),
            api_domain: Some("http://localhost:9000".to_string()),
            log_file: Some("run.log".to_string()),
            ..Args::default()
        };

        apply_cli_overrides(&mut config, &args);

        assert_eq!(config.organizations_file, "orgs.json");
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.api_domain, "http://localhost:9000");
        assert_eq!(config.log_file_path.as_deref(), Some("run.log"));
        assert_eq!(config.max_retries, Config::default().max_retries);
    }

    #[tokio::test]
    #[serial]
    async fn test_init_config_writes_file_once() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bsm_structure").join("config.toml");
        let path_str = path.to_string_lossy().to_string();
        let args = Args {
            output_dir: Some("snapshots".to_string()),
            ..Args::default()
        };

        init_config_at(&path_str, &args).await.unwrap();
        let written = Config::load_from_path(&path_str).await.unwrap();
        assert_eq!(written.output_dir, "snapshots");

        // Second run leaves the file alone
        let other = Args {
            output_dir: Some("elsewhere".to_string()),
            ..Args::default()
        };
        init_config_at(&path_str, &other).await.unwrap();
        let reread = Config::load_from_path(&path_str).await.unwrap();
        assert_eq!(reread.output_dir, "snapshots");
    }
}
