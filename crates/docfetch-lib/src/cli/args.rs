use crate::download::DownloadLayout;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigOverrides {
    #[arg(
        short = 'i',
        long = "identifiers",
        value_name = "FILE",
        help = "Overrides the identifier list file (one product identifier per line)"
    )]
    pub identifiers_path: Option<PathBuf>,

    #[arg(
        short = 'o',
        long = "download-dir",
        value_name = "DIR",
        help = "Overrides the directory the browser downloads into"
    )]
    pub download_dir: Option<PathBuf>,

    #[arg(
        long = "layout",
        value_name = "LAYOUT",
        help = "Overrides the artifact layout below the download directory"
    )]
    pub layout: Option<DownloadLayout>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Run {
        config_path: Option<String>,
        overrides: ConfigOverrides,
        webdriver_url: Option<String>,
        headless: bool,
        download_timeout_secs: Option<u64>,
    },
    Check {
        config_path: Option<String>,
        overrides: ConfigOverrides,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "docfetch",
    version,
    author = "Nick Guletskii",
    about = "Download product documentation from an authenticated vendor portal, one identifier at a time"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Log in, search every identifier and download its documentation
    Run {
        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Sets a custom config file (default: docfetch.yaml, if present)"
        )]
        config: Option<String>,

        #[command(flatten)]
        overrides: ConfigOverrides,

        #[arg(
            long = "webdriver-url",
            value_name = "URL",
            help = "Overrides the WebDriver server URL"
        )]
        webdriver_url: Option<String>,

        #[arg(long = "headless", help = "Runs the browser without a window")]
        headless: bool,

        #[arg(
            long = "download-timeout",
            value_name = "SECONDS",
            help = "Overrides how long to wait for each download to complete"
        )]
        download_timeout: Option<u64>,
    },

    /// Report which identifiers would be fetched or skipped, without starting a browser
    Check {
        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Sets a custom config file (default: docfetch.yaml, if present)"
        )]
        config: Option<String>,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("thirtyfour=warn".parse().unwrap())
                .add_directive("hyper_util=warn".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Run {
            config,
            overrides,
            webdriver_url,
            headless,
            download_timeout,
        } => Command::Run {
            config_path: config,
            overrides,
            webdriver_url,
            headless,
            download_timeout_secs: download_timeout,
        },
        CliCommand::Check { config, overrides } => Command::Check {
            config_path: config,
            overrides,
        },
    };

    Args { command, log_level }
}
