// src/main.rs
use bsm_structure::cli::{Args, is_config_only};
use bsm_structure::commands::{
    apply_cli_overrides, handle_init_config_command, handle_list_config_command, validate_args,
};
use bsm_structure::config::Config;
use bsm_structure::error::AppError;
use bsm_structure::logging::ErrorSink;
use bsm_structure::{app, logging};
use chrono::{Datelike, Local};
use clap::Parser;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    // Held until the end of main so the final error still reaches the log file
    let mut log_guard: Option<WorkerGuard> = None;

    match run(args, &mut log_guard).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ErrorSink::new(log_guard.is_some()).report(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args, log_guard: &mut Option<WorkerGuard>) -> Result<(), AppError> {
    validate_args(&args)?;

    if is_config_only(&args) {
        if args.list_config {
            return handle_list_config_command().await;
        }
        return handle_init_config_command(&args).await;
    }

    let mut config = Config::load().await?;
    apply_cli_overrides(&mut config, &args);
    config.validate()?;

    let (log_file_path, guard) = logging::setup_logging(&args, &config).await?;
    *log_guard = Some(guard);
    tracing::info!("Logs are being written to: {log_file_path}");

    let year = args.year.unwrap_or_else(|| Local::now().year());
    app::run(&config, year).await?;

    Ok(())
}
