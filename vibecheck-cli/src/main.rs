//! The `vibecheck` binary: scan, trace, ship, fix.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Exit code for cancellation, per POSIX convention (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "vibecheck", version)]
#[command(about = "Scan a source tree for AI-generated defects and report a Ship Score")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Project root to analyze.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Emit a machine-readable Command Result object.
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level).
    #[arg(long, global = true)]
    verbose: bool,

    /// Errors only.
    #[arg(long, global = true)]
    quiet: bool,

    /// Explicit config file (default: <root>/vibecheck.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pattern registry over the tree and write the truthpack.
    Scan {
        /// Write the JSON report to a file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Whole-scan timeout in milliseconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Force a full rescan, ignoring caches and incremental state.
        #[arg(long)]
        forge: bool,
    },

    /// Drift analysis against the recorded truthpack.
    Trace {},

    /// Scan + verify + score; exits nonzero on BLOCK.
    Ship {},

    /// Apply autofix transactions.
    Fix {
        /// Confirm each edit on stdin.
        #[arg(long)]
        interactive: bool,

        /// Actually write files (default is report-only).
        #[arg(long)]
        apply: bool,

        /// List the planned edits without writing.
        #[arg(long)]
        dry_run: bool,

        /// Minimum finding confidence, 0.0–1.0. Default 0.8.
        #[arg(long)]
        confidence: Option<f64>,

        /// Roll back a previously applied transaction.
        #[arg(long)]
        rollback: Option<String>,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let no_color = std::env::var_os("NO_COLOR").is_some();
    let force_color = std::env::var_os("FORCE_COLOR").is_some();
    let ansi = force_color || !no_color;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let code = match &cli.command {
        Command::Scan {
            output,
            timeout,
            forge,
        } => commands::scan::run(&cli, output.as_deref(), *timeout, *forge),
        Command::Trace {} => commands::trace::run(&cli),
        Command::Ship {} => commands::ship::run(&cli),
        Command::Fix {
            interactive,
            apply,
            dry_run,
            confidence,
            rollback,
        } => commands::fix::run(
            &cli,
            *interactive,
            *apply,
            *dry_run,
            *confidence,
            rollback.as_deref(),
        ),
    };
    std::process::exit(code);
}

impl Cli {
    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Load config from `--config` or `<root>/vibecheck.toml`.
    pub fn load_config(&self) -> Result<vibecheck_core::VibeConfig, vibecheck_core::errors::ScanError> {
        match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw).map_err(|e| {
                    vibecheck_core::errors::ScanError::InvalidInput {
                        message: format!("{}: {e}", path.display()),
                    }
                })
            }
            None => vibecheck_core::VibeConfig::load(&self.root),
        }
    }
}
