// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::Path;

use crate::app_config::Config;
use app_controller::{Controller, RunOptions};

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod mode;
mod models;
mod publisher;
mod retry;
mod sources;
mod store;
mod translation;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for tweetbridge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// tweetbridge - translate and republish posts between accounts
///
/// Polls an X account for new posts, translates them to Simplified Chinese,
/// and republishes them to a paired Weibo account.
#[derive(Parser, Debug)]
#[command(name = "tweetbridge")]
#[command(version = "1.0.0")]
#[command(about = "Polls an X account, translates new posts, republishes them to Weibo")]
#[command(long_about = "tweetbridge polls an X account for new posts, translates them to \
Simplified Chinese, and republishes them to a paired Weibo account, switching automatically \
between the authenticated API and a scraping fallback when the API keeps failing.

EXAMPLES:
    tweetbridge --username sasakirico --once        # Single pass
    tweetbridge --username sasakirico --interval 10 # Poll every 10 minutes
    tweetbridge --test --once                       # Dry run, no publishes
    tweetbridge --no-api --force                    # Scrape only, skip cache
    tweetbridge completions bash > tweetbridge.bash # Generate completions

CONFIGURATION:
    Credentials live in conf.json by default (see --config). A default file
    is created on first run; fill in the API keys before a non-test run.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Dry-run mode: assemble and validate publishes without posting
    #[arg(long)]
    test: bool,

    /// Handle of the account to poll (without the @)
    #[arg(short, long, alias = "artist")]
    username: Option<String>,

    /// Maximum posts to fetch per cycle
    #[arg(short, long, default_value_t = 5)]
    count: usize,

    /// Minutes between cycles
    #[arg(short, long, default_value_t = 10)]
    interval: u64,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Force the scraping read mode, skipping all API state tracking
    #[arg(long = "no-api")]
    no_api: bool,

    /// Bypass the fetch cache
    #[arg(short, long)]
    force: bool,

    /// Mirror raw fetched posts to this path (Windows drive paths are
    /// translated to their host mount point)
    #[arg(long = "windows-path")]
    windows_path: Option<String>,

    /// Configuration file path
    #[arg(long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // max_level can change after config load; honor the live value
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} [{}] {} {}\x1B[0m",
                color,
                now,
                record.target(),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "tweetbridge", &mut std::io::stdout());
            Ok(())
        }
        None => run_service(cli).await,
    }
}

async fn run_service(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        apply_log_level(&cmd_log_level.clone().into());
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // CLI flags override the config file
    if let Some(username) = &options.username {
        config.artist_handle = username.clone();
    }
    if options.test {
        config.test_mode = true;
    }
    if options.log_level.is_none() {
        apply_log_level(&config.log_level);
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Starting tweetbridge for @{} ({} mode, check interval {} minutes)",
        config.artist_handle,
        if config.test_mode { "test" } else { "normal" },
        options.interval
    );
    if let Some(path) = &options.windows_path {
        info!("Raw posts will be mirrored to: {}", path);
    }

    let run_options = RunOptions {
        count: options.count,
        force: options.force,
        no_api: options.no_api,
        windows_path: options.windows_path.clone(),
    };

    let mut controller = Controller::new(config, run_options)?;

    if options.once {
        let summary = controller.run_once().await?;
        info!(
            "Single pass complete: {} fetched, {} new, {} published, {} failed",
            summary.fetched, summary.new_posts, summary.published, summary.failed
        );
        Ok(())
    } else {
        controller.run_loop(options.interval).await?;
        Ok(())
    }
}

/// Load the config file, seeding a default one when it does not exist
fn load_or_create_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path)
    } else {
        warn!(
            "Config file {} not found, creating one with defaults; credentials must be filled in before a non-test run",
            path
        );
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }
}

/// Apply a configured log level to the global logger
fn apply_log_level(level: &app_config::LogLevel) {
    let filter = match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    };
    log::set_max_level(filter);
}
