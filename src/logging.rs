use crate::cli::Args;
use crate::config::Config;
use crate::constants::LOG_FILE_NAME;
use crate::error::AppError;
use std::io::stdout;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Resolves the log directory and file name.
///
/// `--log-file` wins over the configured path; without either the platform
/// log directory is used.
pub fn resolve_log_location(args: &Args, config: &Config) -> (String, String) {
    match args.log_file.as_ref().or(config.log_file_path.as_ref()) {
        Some(custom_path) => {
            let path = Path::new(custom_path);
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(LOG_FILE_NAME);
            (parent.to_string_lossy().to_string(), file_name.to_string())
        }
        None => (Config::get_log_dir_path(), LOG_FILE_NAME.to_string()),
    }
}

fn env_filter(debug: bool) -> Result<EnvFilter, AppError> {
    let directive = if debug {
        "bsm_structure=debug"
    } else {
        "bsm_structure=info"
    };
    let directive = directive
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Where an error that ends the run is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorSink {
    /// Logging is not set up yet.
    #[default]
    Stderr,
    /// The tracing subscriber is installed; its stdout layer shows the error.
    Log,
}

impl ErrorSink {
    /// Sink for the current state of logging setup.
    pub fn new(logging_ready: bool) -> Self {
        if logging_ready {
            ErrorSink::Log
        } else {
            ErrorSink::Stderr
        }
    }

    /// Reports `error` exactly once.
    pub fn report(self, error: &AppError) {
        match self {
            ErrorSink::Stderr => eprintln!("Error: {error}"),
            ErrorSink::Log => tracing::error!("{error}"),
        }
    }
}

/// Sets up logging to stdout and to a daily rolling log file.
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(args: &Args, config: &Config) -> Result<(String, WorkerGuard), AppError> {
    let (log_dir, log_file_name) = resolve_log_location(args, config);

    if !Path::new(&log_dir).exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);

    // The guard must outlive every log call or buffered lines are lost
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(stdout)
                .with_ansi(true)
                .with_target(false)
                .with_filter(env_filter(args.debug)?),
        )
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter(args.debug)?),
        )
        .try_init()
        .map_err(|e| AppError::log_setup_error(e.to_string()))?;

    let log_file_path = format!("{log_dir}/{log_file_name}");
    Ok((log_file_path, guard))
}
