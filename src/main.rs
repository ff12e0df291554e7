//! CLI for pubsub-adapter
//!
//! Subcommands:
//! - `run`: publish load against a topic with a number of virtual users
//! - `check`: print the resolved configuration

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use pubsub_adapter::client::Publisher;
use pubsub_adapter::config::{Settings, load_config};
use pubsub_adapter::runner::{self, RunSummary};
use pubsub_adapter::transport::{InMemoryTransport, Transport};
use pubsub_adapter::utils::logging;

#[derive(Parser)]
#[command(name = "pubsub-adapter")]
enum Command {
    /// Publish load against a topic
    Run {
        /// Topic to publish to (overrides `run.topic`)
        #[arg(long)]
        topic: Option<String>,
        /// Message payload (overrides `run.message`)
        #[arg(long)]
        message: Option<String>,
        /// Number of concurrent virtual users
        #[arg(long)]
        vus: Option<usize>,
        /// Iterations per virtual user
        #[arg(long)]
        iterations: Option<u64>,
        /// Publish into memory instead of Pub/Sub
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved configuration
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let mut settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("error");
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cmd {
        Command::Check => {
            println!("{:#?}", settings);
            ExitCode::SUCCESS
        }
        Command::Run {
            topic,
            message,
            vus,
            iterations,
            dry_run,
        } => {
            if let Some(topic) = topic {
                settings.run.topic = topic;
            }
            if let Some(message) = message {
                settings.run.message = message;
            }
            if let Some(vus) = vus.filter(|v| *v > 0) {
                settings.run.vus = vus;
            }
            if let Some(iterations) = iterations {
                settings.run.iterations = iterations;
            }
            settings.run.dry_run |= dry_run;

            run_load(settings).await
        }
    }
}

async fn run_load(settings: Settings) -> ExitCode {
    let level = if settings.publisher.debug || settings.publisher.trace {
        settings.publisher.log_level()
    } else {
        settings.run.log_level.as_str()
    };
    logging::init(level);

    let summary = if settings.run.dry_run {
        let publisher = Publisher::new(settings.publisher.clone(), InMemoryTransport::new());
        drive(Arc::new(publisher), &settings).await
    } else {
        // setup errors abort the run
        match Publisher::connect(settings.publisher.clone()).await {
            Ok(publisher) => drive(Arc::new(publisher), &settings).await,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    };

    println!(
        "started {} | vus {} | sent {} | errors {} | took {:?}",
        summary.started_at.to_rfc3339(),
        summary.vus,
        summary.messages_sent,
        summary.publish_errors,
        summary.elapsed
    );

    if summary.publish_errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn drive<T: Transport + 'static>(
    publisher: Arc<Publisher<T>>,
    settings: &Settings,
) -> RunSummary {
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received. Stopping virtual users.");
            on_signal.cancel();
        }
    });

    let summary = runner::run(publisher.clone(), &settings.run, shutdown).await;
    publisher.shutdown().await;
    summary
}
