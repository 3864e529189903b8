//! deconfig - keep secrets out of exported configuration
//!
//! Maintenance entry point for export stores wrapped by deconfig:
//! - Repairing records that leak hidden configuration
//! - Checking an export store without changing it
//! - Showing records as the application would read them
//! - Regenerating the export store from the live store

use clap::{Args, Parser, Subcommand};
use deconfig_cli::commands::{run_check, run_export, run_remove_hidden, run_show};
use deconfig_cli::logging::{event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use deconfig_cli::{load_config, Backend, CliError, ConfigOptions, ExitCode, OutputFormat, ShowRequest};
use deconfig_store::DEFAULT_COLLECTION;
use std::path::PathBuf;
use tracing::{debug, error, info, info_span};

/// deconfig - hide secrets from exported configuration and restore them on read
#[derive(Parser)]
#[command(name = "deconfig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to deconfig.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the export store directory
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Override the live store directory
    #[arg(long, global = true)]
    live_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite exported records that leak hidden configuration
    #[command(visible_alias = "drh")]
    RemoveHidden,

    /// List exported records that leak hidden configuration
    Check,

    /// Print a record as read through deconfig
    Show(ShowArgs),

    /// Regenerate the export store from the live store
    Export,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Record name
    name: String,

    /// Skip leak detection
    #[arg(long)]
    raw: bool,

    /// Collection holding the record (default collection when omitted)
    #[arg(long)]
    collection: Option<String>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError.as_i32()
            } else {
                ExitCode::Clean.as_i32()
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let run_id = generate_run_id();
    let span = info_span!("deconfig", run_id = %run_id);
    let _guard = span.enter();
    debug!(event = event_names::RUN_STARTED, command = ?cli.command, "Run started");

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            let code = err.exit_code();
            if code.is_internal_error() {
                error!(event = event_names::INTERNAL_ERROR, error = %err, "Command failed");
            } else if matches!(err, CliError::Config(_)) {
                error!(event = event_names::CONFIG_ERROR, error = %err, "Configuration failed");
            }
            eprintln!("error: {err}");
            code
        }
    };

    debug!(event = event_names::RUN_FINISHED, exit_code = %exit_code, "Run finished");
    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let resolved = load_config(&ConfigOptions {
        config_path: cli.global.config.clone(),
        export_dir: cli.global.export_dir.clone(),
        live_dir: cli.global.live_dir.clone(),
    })?;
    match &resolved.path {
        Some(path) => info!(
            event = event_names::CONFIG_LOADED,
            source = %resolved.source,
            path = %path.display(),
            "Configuration loaded"
        ),
        None => debug!(event = event_names::CONFIG_DEFAULT_USED, "Using default configuration"),
    }

    let backend = Backend::open(&resolved.config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::RemoveHidden => run_remove_hidden(&backend, &mut out),
        Commands::Check => run_check(&backend, &mut out),
        Commands::Show(args) => run_show(
            &backend,
            &ShowRequest {
                name: &args.name,
                collection: args.collection.as_deref().unwrap_or(DEFAULT_COLLECTION),
                raw: args.raw,
                format: args.format,
            },
            &mut out,
        ),
        Commands::Export => run_export(&backend, &mut out),
    }
}
