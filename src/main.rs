//! testsum - Run go test and summarize the results

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use testsum::clock::SystemClock;
use testsum::config::{resolve_package_path, TestsumConfig};
use testsum::error::{Error, Result};
use testsum::format::FormatOptions;
use testsum::gotest::GoTestCommand;
use testsum::run::{run, Input, RunOptions};
use testsum::summary::{SummaryOptions, SummarySection};
use tracing_subscriber::EnvFilter;

/// Exit code for failures of testsum itself, as opposed to failing tests.
const EXIT_INTERNAL_ERROR: i32 = 3;

#[derive(Parser)]
#[command(name = "testsum", version)]
#[command(about = "Run go test and summarize the results", long_about = None)]
struct Cli {
    /// Formats to print test events in, comma separated: debug,
    /// standard-verbose, standard-quiet, dots, short, short-verbose
    #[arg(short = 'f', long, env = "TESTSUM_FORMAT", value_delimiter = ',')]
    format: Vec<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Treat the arguments after -- as the whole command to run
    #[arg(long)]
    raw_command: bool,

    /// Read test events from a file instead of running go test
    #[arg(long, conflicts_with = "raw_command")]
    jsonfile: Option<PathBuf>,

    /// Import path prefix to strip from package names
    #[arg(long)]
    pkg_prefix: Option<String>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Summary sections to leave out, comma separated: skipped, failed, errors
    #[arg(long, value_delimiter = ',')]
    no_summary: Vec<SummarySection>,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long)]
    directory: Option<PathBuf>,

    /// Arguments for go test, or the command to run with --raw-command
    #[arg(last = true)]
    args: Vec<String>,
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run_options(cli: Cli) -> Result<RunOptions> {
    let dir = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = TestsumConfig::load(&dir)?;
    let package_path = resolve_package_path(cli.pkg_prefix.as_deref(), &config, &dir)?;

    let formats = if cli.format.is_empty() {
        config.format.clone()
    } else {
        cli.format
    };
    let hide = if cli.no_summary.is_empty() {
        config.no_summary.clone()
    } else {
        cli.no_summary
    };
    let color = !cli.no_color && config.color.unwrap_or(true) && console::colors_enabled();

    let input = match cli.jsonfile {
        Some(path) => Input::JsonFile(dir.join(path)),
        None => Input::Command(GoTestCommand::new(&cli.args, cli.raw_command, &dir)?),
    };

    Ok(RunOptions {
        formats,
        format_options: FormatOptions {
            package_path: package_path.clone(),
            color,
        },
        summary: SummaryOptions { package_path, hide },
        input,
    })
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = run_options(cli).and_then(|opts| {
        let mut out = io::stdout();
        let mut err = io::stderr();
        run(&opts, &mut out, &mut err, Arc::new(SystemClock))
    });

    match result {
        Ok(_) => {}
        Err(e @ Error::Subprocess { .. }) => {
            std::process::exit(e.exit_code().unwrap_or(1));
        }
        Err(e) => {
            let _ = writeln!(io::stderr(), "testsum: Error: {}", e);
            std::process::exit(EXIT_INTERNAL_ERROR);
        }
    }
}
