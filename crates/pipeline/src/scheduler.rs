//! Interval scheduler for the collection pipeline.
//!
//! A single background task owns the timer and runs the pipeline inline, so
//! a run that outlasts the interval skips missed ticks instead of
//! overlapping it.

use crate::pipeline::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    interval: Duration,
    initial_run: bool,
}

impl Scheduler {
    pub fn new(pipeline: Arc<Pipeline>, interval: Duration) -> Self {
        Self {
            pipeline,
            interval,
            initial_run: true,
        }
    }

    /// Whether to run once immediately on start (default: true).
    pub fn with_initial_run(mut self, initial_run: bool) -> Self {
        self.initial_run = initial_run;
        self
    }

    /// Spawn the background loop.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let Self {
            pipeline,
            interval,
            initial_run,
        } = self;

        info!(
            interval_secs = interval.as_secs(),
            initial_run, "Scheduler started"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            if !initial_run {
                // The first tick completes immediately
                ticker.tick().await;
            }

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Scheduler shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {
                        pipeline.run().await;
                    }
                }
            }

            info!("Scheduler stopped");
        });

        SchedulerHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Controls a running scheduler. Dropping it also stops the loop after any
/// in-flight run.
pub struct SchedulerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for an in-flight run to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "Scheduler task ended abnormally");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}
