use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Returns true when the invocation only manages configuration and makes no API calls.
pub fn is_config_only(args: &Args) -> bool {
    args.list_config || args.init_config
}

/// BSM structure extractor
///
/// Fetches the season's matches of every configured organization from the
/// BSM API and writes the organizations → leagues → teams → clubs hierarchy
/// to `<output-dir>/bsm-structure-<year>.json`.
///
/// Organizations are processed one at a time with a pause between requests.
/// Press Ctrl+C to stop; the previous snapshot is left untouched.
#[derive(Parser, Debug, Default)]
#[command(about, version, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// Season year to fetch. Defaults to the current year.
    #[arg(short, long)]
    pub year: Option<i32>,

    /// JSON file mapping organization names to ids.
    #[arg(short, long = "organizations", value_name = "PATH", help_heading = "Run Options")]
    pub organizations_file: Option<String>,

    /// Directory the snapshot is written to.
    #[arg(long = "output-dir", value_name = "DIR", help_heading = "Run Options")]
    pub output_dir: Option<String>,

    /// API domain to query instead of the configured one.
    #[arg(long = "api-domain", value_name = "URL", help_heading = "Run Options")]
    pub api_domain: Option<String>,

    /// Write a config file with the current settings to the default location.
    #[arg(long = "init-config", help_heading = "Configuration")]
    pub init_config: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Log at debug level, including every HTTP attempt.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}
