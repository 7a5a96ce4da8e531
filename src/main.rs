use clap::Parser;
use colored::Colorize;
use log::{LevelFilter, error, info};
use simplelog::{CombinedLogger, Config as LogConfig, SharedLogger, TermLogger, TerminalMode, WriteLogger};

mod commands;

use unpackr::Config;

#[derive(Parser)]
#[command(name = "unpackr")]
#[command(about = "Unpack files from a git repository into a new directory")]
#[command(version)]
#[command(after_help = "Prompts for package dependency installation where applicable")]
struct Cli {
    /// Repository to clone and unpack (URL or path)
    repository: Option<String>,

    /// Unpack destination directory (must not exist)
    destination: Option<String>,

    /// Repository branch to unpack
    #[arg(short, long)]
    branch: Option<String>,

    /// Repository tag to unpack
    #[arg(short, long)]
    tag: Option<String>,

    /// Install every unpacked dependency with this package manager (npm, yarn)
    /// instead of prompting
    #[arg(long, value_name = "MANAGER")]
    install: Option<String>,

    /// Print debug logs to console
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load();
    init_logging(&config, cli.debug);

    // Failures are reported, not signalled through the exit status
    if let Err(e) = run(cli, &config) {
        error!("{}", e);
        println!("{}", format!("Error: {}", e).red());
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Debug,
            LogConfig::default(),
            TerminalMode::Stderr,
            simplelog::ColorChoice::Auto,
        ));
    }

    // File logger: always on at debug level
    let log_path = config.logs_dir.join("unpackr.log");
    if let Ok(()) = std::fs::create_dir_all(&config.logs_dir)
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
    {
        loggers.push(WriteLogger::new(LevelFilter::Debug, LogConfig::default(), file));
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn print_usage_hint() {
    println!(
        "More information: {} or {}",
        "unpackr -h".yellow(),
        "unpackr --help".yellow()
    );
}

fn run(cli: Cli, config: &Config) -> unpackr::Result<()> {
    let Some(repository) = cli.repository else {
        println!("{}", "Missing repository argument".red());
        print_usage_hint();
        return Ok(());
    };

    let Some(destination) = cli.destination else {
        println!("{}", "Missing unpack destination argument".red());
        print_usage_hint();
        return Ok(());
    };

    info!(
        "command: unpack (repository={}, destination={}, branch={:?}, tag={:?}, install={:?})",
        repository, destination, cli.branch, cli.tag, cli.install
    );
    commands::handle_unpack(repository, destination, cli.branch, cli.tag, cli.install, config)
}
