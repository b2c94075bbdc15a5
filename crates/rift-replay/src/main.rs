//! Rift Replay - re-issue captured proxy history under a different credential
//!
//! # Usage
//!
//! ```bash
//! # Replay every request exactly as recorded
//! rift-replay -f history.xml
//!
//! # Swap the session cookie on every request
//! rift-replay -f history.xml -H "Cookie: session=low-privilege"
//!
//! # Pool and timeout settings from a file, machine-readable output
//! rift-replay -f history.xml -c replay.yaml --output json
//! ```

use anyhow::Context;
use clap::Parser;
use rift_replay::{
    build_requests, load_capture, replay_all, HeaderOverride, OutputFormat, ReplayClient,
    ReplayConfig, Reporter,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rift-replay")]
#[command(
    author,
    version,
    about = "Replay captured proxy history with an optional header override"
)]
struct Args {
    /// Proxy history export (XML) to replay
    #[arg(short, long)]
    file: PathBuf,

    /// Header forced onto every request, as "Name: value"
    #[arg(short = 'H', long, env = "RIFT_REPLAY_HEADER")]
    header: Option<String>,

    /// YAML file with timeout and connection pool settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum in-flight requests per origin
    #[arg(long)]
    max_conns_per_host: Option<usize>,

    /// Maximum idle pooled connections per origin
    #[arg(long)]
    max_idle_per_host: Option<usize>,

    /// Maximum idle pooled connections overall
    #[arg(long)]
    max_idle: Option<usize>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn replay_config(&self) -> anyhow::Result<ReplayConfig> {
        let mut config = match &self.config {
            Some(path) => ReplayConfig::from_file(path)?,
            None => ReplayConfig::default(),
        };

        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(max) = self.max_conns_per_host {
            config.connection_pool.max_conns_per_host = max;
        }
        if let Some(max) = self.max_idle_per_host {
            config.connection_pool.max_idle_per_host = max;
        }
        if let Some(max) = self.max_idle {
            config.connection_pool.max_idle = max;
        }
        config.insecure |= self.insecure;

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "rift_replay=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.replay_config()?;
    let header = args
        .header
        .as_deref()
        .map(HeaderOverride::parse)
        .transpose()?;
    let reporter = Reporter::new(args.output, !args.no_color);

    // Parsing is all-or-nothing: nothing is sent unless every item decodes
    let captured = load_capture(&args.file)
        .with_context(|| format!("could not load capture {}", args.file.display()))?;
    let requests = build_requests(captured, header.as_ref())?;

    let stdout = std::io::stdout();
    reporter.write_loaded(&mut stdout.lock(), &args.file, &requests)?;

    let client = ReplayClient::new(config)?;
    let results = replay_all(&client, requests).await;

    let mut out = stdout.lock();
    reporter.write_results(&mut out, &results)?;
    out.flush()?;

    Ok(())
}
