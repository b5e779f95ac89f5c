//! CLI tool to print files through a chain of line transformations.
//!
//! Usage:
//!   pipecat [-s] [-n | -b] [-E] [-T] <file>...
//!
//! Output goes to stdout; diagnostics and logs go to stderr.

use clap::{Parser, ValueEnum};
use pipecat::{CancelToken, ExecutorKind, FailurePolicy, NumberingScope, Options, Pipeline, Sink};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Concatenate files to stdout, optionally squeezing blank lines, numbering
/// lines, and making line ends and tabs visible.
#[derive(Parser)]
#[command(name = "pipecat", version)]
struct Cli {
    /// Suppress repeated empty output lines
    #[arg(short = 's', long)]
    squeeze_blank: bool,

    /// Number all output lines ("<n>: ")
    #[arg(short = 'n', long)]
    number: bool,

    /// Number non-empty output lines ("<n>:"), overrides -n
    #[arg(short = 'b', long)]
    number_nonblank: bool,

    /// Display $ at the end of each line
    #[arg(short = 'E', long, short_alias = 'e')]
    show_ends: bool,

    /// Display TAB characters as ^I
    #[arg(short = 'T', long, short_alias = 't')]
    show_tabs: bool,

    /// Report unreadable files at the end instead of stopping at the first
    #[arg(long)]
    continue_on_error: bool,

    /// Restart line numbers at 1 for every file
    #[arg(long)]
    reset_numbering: bool,

    /// Treat lines longer than N bytes as read errors
    #[arg(long, value_name = "N")]
    max_line_bytes: Option<usize>,

    /// How records are moved between stages
    #[arg(long, value_enum, default_value = "threaded")]
    executor: Executor,

    /// Show pipeline and per-file details on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Files to print, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Executor {
    /// One thread per stage, connected by rendezvous channels
    Threaded,
    /// One record at a time on the main thread
    Pull,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            squeeze_blank: self.squeeze_blank,
            number: self.number,
            number_nonblank: self.number_nonblank,
            show_ends: self.show_ends,
            show_tabs: self.show_tabs,
            failure_policy: if self.continue_on_error {
                FailurePolicy::Skip
            } else {
                FailurePolicy::Abort
            },
            numbering_scope: if self.reset_numbering {
                NumberingScope::File
            } else {
                NumberingScope::Run
            },
            executor: match self.executor {
                Executor::Threaded => ExecutorKind::Threaded,
                Executor::Pull => ExecutorKind::Pull,
            },
            max_line_len: self.max_line_bytes,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PIPECAT_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pipecat=debug")
        } else {
            EnvFilter::new("pipecat=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.options();
    let mut pipeline = Pipeline::from_options(&options);
    let stdout = io::stdout();
    let mut sink = Sink::new(stdout.lock(), options.failure_policy);

    match pipeline.run(&cli.files, &mut sink, &CancelToken::new()) {
        Ok(summary) => {
            debug!(
                files = summary.files,
                read = summary.lines_read,
                written = summary.lines_written,
                failed = summary.files_failed(),
                "run complete"
            );
            if !summary.is_success() {
                for failure in &summary.failures {
                    eprintln!("pipecat: {failure}");
                }
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("pipecat: {e}");
            process::exit(1);
        }
    }
}
