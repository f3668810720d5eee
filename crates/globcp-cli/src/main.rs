//! globcp - copy glob-selected files to a remote host over SSH
//!
//! Files are selected from a local folder with include/exclude content
//! patterns and uploaded one at a time over SFTP, optionally emptying the
//! remote folder first.

mod display;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use globcp_config::{parse_pattern_lines, Config, ConfigLoader};
use globcp_engine::{CopyOptions, CopyOrchestrator, TargetResolver};
use globcp_remote::SshConnector;
use globcp_select::SelectionEngine;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// globcp - copy glob-selected files to a remote host over SSH
#[derive(Parser, Debug)]
#[command(
    name = "globcp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy glob-selected files to a remote host over SSH",
    long_about = "globcp selects files from a local folder with include and exclude\n\
                  content patterns (prefix a pattern with ! to exclude) and uploads\n\
                  them over SFTP, one file at a time."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy selected files to the remote host
    Copy(CopyArgs),
    /// Show which files would be selected and where they would go
    Select(SelectionArgs),
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
        /// Write the configuration to a file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Local selection and target layout overrides
#[derive(Args, Debug, Default)]
struct SelectionArgs {
    /// Source folder
    #[arg(short, long)]
    source: Option<PathBuf>,
    /// Content pattern (repeatable; prefix with ! to exclude)
    #[arg(short, long = "pattern")]
    patterns: Vec<String>,
    /// File with one content pattern per line
    #[arg(long)]
    patterns_file: Option<PathBuf>,
    /// Remote target folder
    #[arg(short, long)]
    target: Option<String>,
    /// Copy every file directly into the target folder
    #[arg(long)]
    flatten: bool,
}

/// Copy run overrides
#[derive(Args, Debug, Default)]
struct CopyArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Fail files whose target already exists
    #[arg(long)]
    no_overwrite: bool,
    /// Empty the remote target folder before copying
    #[arg(long)]
    clean: bool,
    /// The remote host runs Windows
    #[arg(long)]
    remote_windows: bool,
    /// Succeed with a warning when no file matches
    #[arg(long)]
    allow_empty: bool,
    /// Remote host
    #[arg(long)]
    host: Option<String>,
    /// Remote SSH port
    #[arg(long)]
    port: Option<u16>,
    /// Remote user name
    #[arg(short, long)]
    user: Option<String>,
    /// Remote password
    #[arg(long, env = "GLOBCP_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Private key file
    #[arg(long)]
    key: Option<PathBuf>,
    /// Connection timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Select and resolve targets without writing anything remotely
    #[arg(long)]
    dry_run: bool,
}

impl SelectionArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(source) = &self.source {
            config.source.root = source.clone();
        }

        let mut patterns = Vec::new();
        if let Some(path) = &self.patterns_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read patterns file '{}'", path.display()))?;
            patterns.extend(parse_pattern_lines(&content));
        }
        patterns.extend(
            self.patterns
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
        if !patterns.is_empty() {
            config.source.patterns = patterns;
        }

        if let Some(target) = &self.target {
            config.target.root = target.clone();
        }
        if self.flatten {
            config.target.flatten = true;
        }
        Ok(())
    }
}

impl CopyArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        self.selection.apply(config)?;

        if self.no_overwrite {
            config.target.overwrite = false;
        }
        if self.clean {
            config.target.clean = true;
        }
        if self.remote_windows {
            config.target.remote_is_windows = true;
        }
        if self.allow_empty {
            config.run.fail_on_empty = false;
        }
        if self.dry_run {
            config.run.dry_run = true;
        }

        if let Some(host) = &self.host {
            config.remote.host = host.clone();
        }
        if let Some(port) = self.port {
            config.remote.port = port;
        }
        if let Some(user) = &self.user {
            config.remote.username = user.clone();
        }
        if let Some(password) = &self.password {
            config.remote.password = Some(password.clone());
        }
        if let Some(key) = &self.key {
            config.remote.private_key_path = Some(key.clone());
        }
        if let Some(timeout) = self.timeout {
            anyhow::ensure!(timeout > 0, "Connection timeout must be at least 1 second");
            config.remote.connect_timeout_secs = timeout;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;

    init_logging(&cli, &config);

    info!("globcp v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Copy(args) => {
            args.apply(&mut config)?;
            copy_command(&config, cli.quiet).await
        }
        Commands::Select(args) => {
            args.apply(&mut config)?;
            select_command(&config)
        }
        Commands::Config { default, output } => {
            config_command(&config, default, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from '{}'", path.display())),
        None => ConfigLoader::load_default().context("Failed to load configuration"),
    }
}

fn init_logging(cli: &Cli, config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        config.logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if config.logging.json_format {
        fmt().json().with_env_filter(filter).with_target(false).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .init();
    }
}

async fn copy_command(config: &Config, quiet: bool) -> Result<ExitCode> {
    config
        .validate_for_run()
        .context("Configuration is incomplete for a copy run")?;

    if !quiet {
        println!(
            "{} Copying {} to {}:{}{}",
            style("→").green().bold(),
            style(config.source.root.display()).cyan(),
            style(&config.remote.host).cyan(),
            style(&config.target.root).cyan(),
            if config.run.dry_run {
                style(" (dry run)").yellow().to_string()
            } else {
                String::new()
            }
        );
    }

    let orchestrator = CopyOrchestrator::new(
        CopyOptions::from(config),
        SshConnector::new(config.remote.clone()),
    );

    let spinner = display::create_spinner(quiet, "Copying files...");
    let result = orchestrator.run().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(report) => {
            if quiet {
                println!("{}", report.summary());
            } else {
                display::print_report(&report, config.run.dry_run);
            }
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            display::print_fatal(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn select_command(config: &Config) -> Result<ExitCode> {
    let selection = SelectionEngine::new()
        .select_from(&config.source.root, config.source.patterns.as_slice())
        .context("Selection failed")?;
    let resolver = TargetResolver::new(
        selection.root(),
        &config.target.root,
        config.target.flatten,
    );

    display::print_selection(&selection, &resolver);

    if selection.is_empty() && config.run.fail_on_empty {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn config_command(config: &Config, default: bool, output: Option<&Path>) -> Result<()> {
    let config = if default {
        Config::default()
    } else {
        config.clone()
    };

    if let Some(path) = output {
        ConfigLoader::save_to_file(&config, path)
            .with_context(|| format!("Failed to write configuration to '{}'", path.display()))?;
        println!(
            "{} Configuration written to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    let mut shown = config;
    if shown.remote.password.is_some() {
        shown.remote.password = Some("********".to_string());
    }
    if shown.remote.private_key_passphrase.is_some() {
        shown.remote.private_key_passphrase = Some("********".to_string());
    }

    println!(
        "{} {} configuration:",
        style("⚙").blue().bold(),
        if default { "Default" } else { "Current" }
    );
    print!("{}", serde_yaml::to_string(&shown)?);
    Ok(())
}
