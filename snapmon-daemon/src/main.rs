use anyhow::{Context, Result};
use clap::Parser;
use snapmon_core::{
    init_observability, Config, LineProtocolSink, MetricSink, OutputFormat, PortMetricsCollector,
    PrometheusSink, DESCRIPTION,
};
use std::path::PathBuf;
use tracing::info;

mod scheduler;

use scheduler::Scheduler;

#[derive(Parser)]
#[command(name = "snapmond")]
#[command(about = "Poll SnapRoute port counters and readiness", long_about = None)]
struct Cli {
    /// Path to the JSON config file (defaults to $SNAPMON_CONFIG or /etc/snapmon/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL prefix of the SnapRoute REST API
    #[arg(short, long)]
    url: Option<String>,

    /// Seconds between polls
    #[arg(short, long)]
    interval: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format (line, prometheus)
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Prometheus endpoint listen address
    #[arg(long)]
    metrics_listen: Option<String>,

    /// Poll once and exit
    #[arg(long)]
    once: bool,

    /// Print a sample config file and exit
    #[arg(long)]
    sample_config: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let path = self.config.clone().unwrap_or_else(Config::config_path);
        let mut config = Config::load(&path)?;
        config.apply_env()?;

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(addr) = &self.metrics_listen {
            config.metrics_listen = Some(addr.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        println!("{}", Config::sample());
        return Ok(());
    }

    let config = cli.config()?;

    // Initialize observability FIRST
    init_observability(&config.log_level, config.metrics_addr()?)?;

    info!(url = %config.url, output = ?config.output, "{}", DESCRIPTION);

    let collector =
        PortMetricsCollector::from_config(&config).context("Failed to create collector")?;
    let sink: Box<dyn MetricSink + Send> = match config.output {
        OutputFormat::Line => Box::new(LineProtocolSink::stdout()),
        OutputFormat::Prometheus => Box::new(PrometheusSink::new()),
    };
    let mut scheduler = Scheduler::new(collector, sink, config.interval());

    if cli.once {
        scheduler.poll_once().await?;
        return Ok(());
    }

    scheduler
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    info!("snapmond shutting down");
    Ok(())
}
