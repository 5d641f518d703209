extern crate alloc;

use std::{io, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use lambda::{
    reducer::{Reducer, Substitution},
    run_file,
};

mod lambda;

/// Reduces an untyped lambda-calculus expression to normal form, printing the
/// term before every reduction step.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Source file holding a single expression, e.g. `(x.x) y`
    file: PathBuf,

    /// Rename binders instead of capturing free variables of the argument
    #[arg(long, env = "LAMBDA_CAPTURE_AVOIDING")]
    capture_avoiding: bool,

    /// Log more to stderr (-v info, -vv debug, -vvv trace); `RUST_LOG` wins
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// Usage errors go to stderr and fail, `--help` and `--version` go to stdout.
fn usage_failed(err: &clap::Error) -> bool {
    err.print().ok();
    err.use_stderr()
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return if usage_failed(&err) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(args.verbose);

    let reducer = Reducer::new(if args.capture_avoiding {
        Substitution::CaptureAvoiding
    } else {
        Substitution::Naive
    });

    match run_file(&args.file, &reducer, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
