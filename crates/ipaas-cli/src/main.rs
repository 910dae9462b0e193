use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ipaas_core::app::{
    ConnectionRepository, IndexScheduler, IndexerConfig, SchedulerState, SeenPolicy,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ipaas", about = "Connector catalog indexed from a Nexus server")]
struct Cli {
    /// Nexus `data_index` endpoint, e.g. http://nexus/service/local/data_index
    /// [default: $NEXUS_URL]
    #[arg(long)]
    index_url: Option<String>,

    /// Seconds between the end of one index cycle and the start of the next
    /// [default: $NEXUS_INDEX_DELAY or 60]
    #[arg(long)]
    delay: Option<u64>,

    /// Keep retrying artifacts whose descriptor could not be read
    #[arg(long)]
    retry_failed: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one index cycle now and print the matching connectors
    Search {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Index in the background until Ctrl-C (or --run-for), then print the catalog
    Watch {
        #[arg(long)]
        filter: Option<String>,
        /// Stop after this many seconds
        #[arg(long)]
        run_for: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "ipaas failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let seen_policy = if cli.retry_failed {
        SeenPolicy::OnSuccess
    } else {
        SeenPolicy::OnDiscovery
    };
    // flags override NEXUS_URL / NEXUS_INDEX_DELAY
    let mut config = IndexerConfig::from_env()?.with_seen_policy(seen_policy);
    if let Some(index_url) = cli.index_url {
        config = config.with_index_url(Some(index_url));
    }
    if let Some(delay) = cli.delay {
        config = config.with_delay(Duration::from_secs(delay));
    }
    config.validate()?;

    let repository = Arc::new(ConnectionRepository::http(&config)?);

    let filter = match cli.command {
        Command::Search { filter } => {
            let report = repository.run_index_cycle().await;
            if let Some(reason) = &report.aborted {
                info!(reason = reason.as_str(), "index cycle ended early");
            }
            filter
        }
        Command::Watch { filter, run_for } => {
            let mut scheduler = IndexScheduler::new(Arc::clone(&repository), &config);
            if scheduler.start() == SchedulerState::Started {
                wait_for_exit(run_for).await?;
                scheduler.stop().await;
            }
            filter
        }
    };

    let json = repository.search_json(filter.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn wait_for_exit(run_for: Option<u64>) -> std::io::Result<()> {
    let deadline = async {
        match run_for {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = deadline => Ok(()),
    }
}
