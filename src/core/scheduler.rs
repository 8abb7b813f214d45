//! Fixed-interval evaluation loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::core::runtime::AlertRuntime;

/// Runs [`AlertRuntime::run_pass`] immediately on start and then once per
/// interval, measured from the end of the previous pass so passes never
/// overlap.
pub struct AlertScheduler {
    runtime: Arc<AlertRuntime>,
    interval: Duration,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl AlertScheduler {
    /// Create a new scheduler
    ///
    /// A zero interval is rejected.
    pub fn new(
        runtime: Arc<AlertRuntime>,
        interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval.is_zero() {
            return Err("Scheduler disabled: interval is 0".into());
        }

        info!(
            interval_secs = interval.as_secs_f64(),
            "AlertScheduler: created with interval {:?}",
            interval
        );

        Ok(Self {
            runtime,
            interval,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the scheduler. Calling start on a running scheduler is a no-op.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut slot = self.handle.write().await;
        if slot.is_some() {
            debug!("AlertScheduler: already running");
            return Ok(());
        }

        let runtime = self.runtime.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            info!("AlertScheduler: started");

            loop {
                // Each pass runs in its own task so a panic in one pass is
                // reported and the loop keeps going.
                let pass_runtime = runtime.clone();
                match tokio::spawn(async move { pass_runtime.run_pass().await }).await {
                    Ok(summary) => {
                        debug!(
                            evaluated = summary.evaluated,
                            triggered = summary.triggered,
                            "AlertScheduler: pass finished"
                        );
                    }
                    Err(e) if e.is_panic() => {
                        error!(error = %e, "AlertScheduler: pass panicked");
                        runtime.publish().await;
                    }
                    Err(e) => {
                        error!(error = %e, "AlertScheduler: pass cancelled");
                    }
                }

                tokio::time::sleep(interval).await;
            }
        });

        *slot = Some(handle);
        info!("AlertScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("AlertScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
