//! The `runner` module drives a publisher the way a load-test host does:
//! a number of virtual users, each running a fixed number of iterations
//! with one publish per iteration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::Publisher;
use crate::config::RunSettings;
use crate::context::{ExecutionContext, VuState};
use crate::transport::Transport;

/// Outcome of a load run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub vus: usize,
    pub messages_sent: u64,
    pub publish_errors: u64,
}

impl RunSummary {
    pub fn attempts(&self) -> u64 {
        self.messages_sent + self.publish_errors
    }
}

/// Runs `settings.vus` virtual users concurrently against `publisher`.
///
/// Every iteration publishes `settings.message` to `settings.topic` with the
/// virtual user and iteration as attributes. A failed publish is counted and
/// the virtual user moves on. Cancelling `shutdown` stops all virtual users
/// after their current iteration.
pub async fn run<T>(
    publisher: Arc<Publisher<T>>,
    settings: &RunSettings,
    shutdown: CancellationToken,
) -> RunSummary
where
    T: Transport + 'static,
{
    let started_at = Utc::now();
    let clock = tokio::time::Instant::now();

    info!(
        topic = %settings.topic,
        vus = settings.vus,
        iterations = settings.iterations,
        "starting load run"
    );

    let tasks = (1..=settings.vus as u64).map(|vu_id| {
        let publisher = publisher.clone();
        let state = Arc::new(VuState::new(vu_id));
        let ctx = ExecutionContext::with_cancellation(state.clone(), shutdown.child_token());
        let topic = settings.topic.clone();
        let message = settings.message.clone();
        let iterations = settings.iterations;

        tokio::spawn(async move {
            for _ in 0..iterations {
                if ctx.is_cancelled() {
                    break;
                }
                let iteration = state.next_iteration();
                let attributes = HashMap::from([
                    ("vu".to_string(), vu_id.to_string()),
                    ("iteration".to_string(), iteration.to_string()),
                ]);
                // failures are already counted and logged by the publisher
                let _ = publisher
                    .publish_with_attributes(&ctx.child(), &topic, &message, attributes)
                    .await;
            }
            state
        })
    });

    let mut messages_sent = 0;
    let mut publish_errors = 0;
    for joined in join_all(tasks).await {
        match joined {
            Ok(state) => {
                messages_sent += state.stats.messages_sent();
                publish_errors += state.stats.publish_errors();
            }
            Err(e) => warn!("virtual user task failed: {e}"),
        }
    }

    let summary = RunSummary {
        started_at,
        elapsed: clock.elapsed(),
        vus: settings.vus,
        messages_sent,
        publish_errors,
    };
    info!(
        sent = summary.messages_sent,
        errors = summary.publish_errors,
        elapsed = ?summary.elapsed,
        "load run finished"
    );
    summary
}
