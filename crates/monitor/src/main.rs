//! Driver Monitor - Main Entry Point
//!
//! Replays recorded detector output (one JSON frame record per line)
//! through the driver alert engine.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use dms::{DmsConfig, MonitorSession};
use monitor::{init_logging, run_monitor, AlertSink, JsonLinesSink, LogSink, ReplaySource, RunOptions};
use tracing::{debug, info, Level};

/// Raise drowsiness, phone-use and distraction alerts from detector output
#[derive(Parser)]
#[command(name = "driver-monitor")]
#[command(version)]
#[command(about = "Replay detector output through the driver alert engine", long_about = None)]
struct Cli {
    /// Frame records, one JSON object per line (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Configuration file (TOML, JSON or YAML); DMS_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate used to timestamp records without timestamp_ms
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Pause after alerts that suggest it (e.g. 4s after drowsiness)
    #[arg(long)]
    honor_pauses: bool,

    /// Write alerts as JSON lines to this file (use - for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("opening input {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_sink(path: Option<&Path>) -> anyhow::Result<Box<dyn AlertSink>> {
    let Some(path) = path else {
        return Ok(Box::new(LogSink));
    };
    let writer: Box<dyn Write> = if is_stdio(path) {
        Box::new(io::stdout())
    } else {
        Box::new(File::create(path).with_context(|| format!("creating output {}", path.display()))?)
    };
    Ok(Box::new(JsonLinesSink::new(writer)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.json_logs)?;

    info!("=== Driver Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = DmsConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let mut session = MonitorSession::new(config)?;
    debug!(config = ?session.config(), "Configuration loaded");
    let mut source = ReplaySource::new(open_input(&cli.input)?, cli.fps)?;
    let mut sink = open_sink(cli.output.as_deref())?;
    let options = RunOptions {
        honor_pauses: cli.honor_pauses,
    };

    let summary = run_monitor(&mut source, &mut session, sink.as_mut(), &options).await?;
    info!(
        frames = summary.frames,
        alerts = summary.total_alerts(),
        "Replay complete"
    );

    Ok(())
}
