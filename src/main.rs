mod cancel;
mod error;
mod follow;
mod seeker;
mod source;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cancel::CancelToken;
use error::{Result, TailError};
use follow::{follow, FollowConfig};
use seeker::TailSeeker;
use source::LogFile;

#[derive(Parser)]
#[command(name = "tailf")]
#[command(about = "Print the last lines of a file, then follow what is appended")]
struct Args {
    file: PathBuf,

    /// Number of trailing lines to print before following
    #[arg(
        short = 'n',
        long,
        value_name = "NUM",
        default_value_t = seeker::DEFAULT_LINE_COUNT,
        value_parser = parse_line_count
    )]
    lines: usize,

    /// Milliseconds to wait between checks for new data
    #[arg(
        short = 's',
        long = "sleep-interval",
        value_name = "MS",
        default_value_t = follow::DEFAULT_POLL_INTERVAL.as_millis() as u64
    )]
    sleep_interval: u64,

    /// Log more to stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_line_count(input: &str) -> std::result::Result<usize, String> {
    let count: usize = input
        .parse()
        .map_err(|_| format!("invalid line count: {}", input))?;
    if count == 0 {
        return Err("line count must be >= 1".to_string());
    }
    Ok(count)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = cancel::on_interrupt()
        .map_err(TailError::from)
        .and_then(|cancel| run(&args, cancel, &mut io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tailf: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "tailf=warn",
        1 => "tailf=info",
        2 => "tailf=debug",
        _ => "tailf=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run<W: Write>(args: &Args, cancel: CancelToken, out: &mut W) -> Result<()> {
    let mut log = LogFile::open(&args.file)?;
    let name = log.display_name();
    let total_len = log.len();

    let window = TailSeeker::new(args.lines).seek(&mut log, total_len)?;
    debug!(
        file = %name,
        total_len,
        start_offset = window.start_offset,
        probes = window.probes,
        "located trailing lines"
    );

    for line in &window.lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    let config = FollowConfig {
        interval: Duration::from_millis(args.sleep_interval),
        ..FollowConfig::default()
    };

    info!(file = %name, "following");
    for text in follow(log, cancel, config) {
        out.write_all(text.as_bytes())?;
        out.flush()?;
    }
    info!(file = %name, "stopped following");

    Ok(())
}
