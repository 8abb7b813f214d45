//! One evaluation pass over every registered alert.
//!
//! A pass fetches each distinct target once, then walks the alerts in
//! registry order: append the observation, evaluate, update edge-state,
//! and on a rising edge notify and record an event. Failures stay local to
//! the alert (or the channel) that caused them.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;
use tracing::{debug, error, info, warn};

use crate::alerts::{apply_edge, compose_message, evaluate};
use crate::core::context::EngineContext;
use crate::error::AlertError;
use crate::indicators::IndicatorError;
use crate::models::{
    Alert, AlertEvent, AlertStatus, AlertUpdate, Condition, MarketDataHints,
    NotifyTarget, Target, User,
};
use crate::services::market_data::Quote;
use crate::services::notifications::Dispatcher;

const QUOTE_FETCH_CONCURRENCY: usize = 4;

type QuoteKey = (Target, MarketDataHints);

/// Counters for a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub evaluated: usize,
    pub triggered: usize,
    pub skipped: usize,
    pub errors: usize,
}

enum AlertOutcome {
    Removed,
    Skipped,
    Failed,
    Quiet,
    Triggered,
}

pub struct AlertRuntime {
    ctx: EngineContext,
}

impl AlertRuntime {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Evaluate every registered alert once and publish a snapshot.
    pub async fn run_pass(&self) -> PassSummary {
        let started = Instant::now();
        let alerts = self.ctx.registry.all().await;
        let quotes = self.fetch_quotes(&alerts).await;

        let mut summary = PassSummary::default();
        for alert in &alerts {
            let outcome = AssertUnwindSafe(self.process_alert(alert, &quotes))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!(alert_id = alert.id, kind = alert.kind().as_str(), "Alert evaluation panicked");
                    if let Some(metrics) = &self.ctx.metrics {
                        metrics.alert_evaluation_errors_total.inc();
                    }
                    AlertOutcome::Failed
                });
            match outcome {
                AlertOutcome::Removed => {}
                AlertOutcome::Skipped => summary.skipped += 1,
                AlertOutcome::Failed => {
                    summary.evaluated += 1;
                    summary.errors += 1;
                }
                AlertOutcome::Quiet => summary.evaluated += 1,
                AlertOutcome::Triggered => {
                    summary.evaluated += 1;
                    summary.triggered += 1;
                }
            }
        }

        if let Some(metrics) = &self.ctx.metrics {
            metrics.alert_cycles_total.inc();
            metrics
                .alert_cycle_duration_seconds
                .observe(started.elapsed().as_secs_f64());
            metrics.alerts_registered.set(self.ctx.registry.len().await as i64);
        }

        debug!(
            alerts = alerts.len(),
            evaluated = summary.evaluated,
            triggered = summary.triggered,
            skipped = summary.skipped,
            errors = summary.errors,
            duration_ms = started.elapsed().as_millis() as u64,
            "Alert pass complete"
        );

        self.publish().await;
        summary
    }

    /// Fetch each distinct (target, hints) pair once.
    async fn fetch_quotes(&self, alerts: &[Alert]) -> HashMap<QuoteKey, Option<Quote>> {
        let mut keys: Vec<QuoteKey> = Vec::new();
        for alert in alerts {
            let primary = (alert.target.clone(), alert.hints.clone());
            if !keys.contains(&primary) {
                keys.push(primary);
            }
            if let Condition::Correlation { with, .. } = &alert.condition {
                let secondary = (with.clone(), MarketDataHints::default());
                if !keys.contains(&secondary) {
                    keys.push(secondary);
                }
            }
        }

        let market_data = &self.ctx.market_data;
        stream::iter(keys)
            .map(|key| async move {
                let quote = market_data.get_quote(&key.0, &key.1).await;
                (key, quote)
            })
            .buffered(QUOTE_FETCH_CONCURRENCY)
            .collect()
            .await
    }

    async fn process_alert(
        &self,
        alert: &Alert,
        quotes: &HashMap<QuoteKey, Option<Quote>>,
    ) -> AlertOutcome {
        let id = alert.id;
        let kind = alert.kind().as_str();
        let now = Utc::now();

        let quote = quotes
            .get(&(alert.target.clone(), alert.hints.clone()))
            .copied()
            .flatten();
        let secondary = match &alert.condition {
            Condition::Correlation { with, .. } => Some(
                quotes
                    .get(&(with.clone(), MarketDataHints::default()))
                    .copied()
                    .flatten(),
            ),
            _ => None,
        };

        let quote = match (quote, secondary) {
            (Some(quote), None) | (Some(quote), Some(Some(_))) => quote,
            _ => {
                debug!(alert_id = id, kind, symbol = alert.label(), "Price unavailable, skipping alert");
                if let Some(metrics) = &self.ctx.metrics {
                    metrics.alert_price_unavailable_total.inc();
                }
                let touched = self
                    .ctx
                    .registry
                    .update(id, |a| {
                        a.last_triggered = false;
                        a.last_evaluated_at = Some(now);
                    })
                    .await;
                return match touched {
                    Some(()) => AlertOutcome::Skipped,
                    None => AlertOutcome::Removed,
                };
            }
        };
        let secondary_price = secondary.flatten().map(|q| q.price);
        let price = quote.price;

        let outcome = self
            .ctx
            .registry
            .update(id, |a| {
                a.last_evaluated_at = Some(now);
                // Keep garbage out of the buffers.
                let observed = [Some(price), quote.high, quote.low, quote.volume, secondary_price];
                let evaluation = if observed.iter().flatten().all(|v| v.is_finite()) {
                    a.series.push(price, quote.high, quote.low, quote.volume);
                    if let Some(price_b) = secondary_price {
                        a.series.history_b.push(price_b);
                    }
                    a.last_price = Some(price);
                    evaluate(a, price, now)
                } else {
                    Err(IndicatorError::NonFinite("quote"))
                };

                match evaluation {
                    Ok(observation) => {
                        a.last_error = None;
                        if apply_edge(a, &observation) {
                            let message = compose_message(a, price, &observation);
                            Ok(Some((a.clone(), message)))
                        } else {
                            Ok(None)
                        }
                    }
                    Err(e) => {
                        a.last_triggered = false;
                        a.last_error = Some(e.to_string());
                        Err(e)
                    }
                }
            })
            .await;

        if let Some(metrics) = &self.ctx.metrics {
            metrics.alert_evaluations_total.inc();
        }

        match outcome {
            None => AlertOutcome::Removed,
            Some(Err(e)) => {
                warn!(alert_id = id, kind, price, error = %e, "Alert evaluation failed");
                if let Some(metrics) = &self.ctx.metrics {
                    metrics.alert_evaluation_errors_total.inc();
                }
                AlertOutcome::Failed
            }
            Some(Ok(None)) => AlertOutcome::Quiet,
            Some(Ok(Some((snapshot, message)))) => {
                info!(alert_id = id, kind, price, message = %message, "Alert triggered");
                if let Some(metrics) = &self.ctx.metrics {
                    metrics.alerts_triggered_total.inc();
                }
                self.notify(snapshot, Some(price), message, false, true).await;
                AlertOutcome::Triggered
            }
        }
    }

    /// Resolve the alert's recipients: its own user record, or every known
    /// user for broadcast alerts.
    pub async fn resolve_recipients(&self, notify: &NotifyTarget) -> Vec<User> {
        match notify {
            NotifyTarget::Broadcast { all_users: true } => self.ctx.users.all_users().await,
            NotifyTarget::Broadcast { all_users: false } => Vec::new(),
            NotifyTarget::User(user) => vec![user.clone()],
        }
    }

    async fn notify(
        &self,
        alert: Alert,
        price: Option<f64>,
        message: String,
        test: bool,
        deliver: bool,
    ) -> AlertEvent {
        let recipients = self.resolve_recipients(&alert.notify).await;
        let subject = format!("Price alert: {}", alert.label());

        let (deliveries, notified_users) = if deliver {
            let deliveries = self
                .ctx
                .dispatcher
                .dispatch(&recipients, &subject, &message)
                .await;
            let delivered = deliveries
                .iter()
                .filter(|d| d.delivered)
                .map(|d| d.recipient.clone())
                .collect();
            (deliveries, delivered)
        } else {
            let planned = Dispatcher::planned(&recipients);
            let recipients = planned.iter().map(|d| d.recipient.clone()).collect();
            (planned, recipients)
        };

        if let (true, Some(metrics)) = (deliver, &self.ctx.metrics) {
            for record in &deliveries {
                let channel = record.channel.as_str();
                if record.delivered {
                    metrics.notifications_sent_total.with_label_values(&[channel]).inc();
                } else {
                    metrics.notifications_failed_total.with_label_values(&[channel]).inc();
                }
            }
        }

        let event = AlertEvent {
            id: 0,
            timestamp: Utc::now(),
            alert,
            price,
            message,
            notified_users,
            deliveries,
            test,
        };
        self.ctx.history.append(event).await
    }

    /// Record a synthetic trigger for the alert at `index` without looking
    /// at market data or touching edge-state. Delivery is only attempted
    /// when `deliver` is set; otherwise the event lists the configured
    /// recipients.
    pub async fn trigger_test(&self, index: usize, deliver: bool) -> Result<AlertEvent, AlertError> {
        let alert = self.ctx.registry.get_at(index).await?;
        let message = format!("[TEST] Alert triggered for {}", alert.label());
        info!(alert_id = alert.id, index, deliver, "Test trigger");

        let event = self.notify(alert, None, message, true, deliver).await;
        self.publish().await;
        Ok(event)
    }

    pub async fn statuses(&self) -> Vec<AlertStatus> {
        self.ctx.registry.statuses().await
    }

    pub async fn snapshot(&self) -> AlertUpdate {
        AlertUpdate::new(
            self.ctx.registry.statuses().await,
            self.ctx.history.list(self.ctx.broadcast_history).await,
        )
    }

    /// Push the current snapshot to live clients.
    pub async fn publish(&self) {
        let update = self.snapshot().await;
        let clients = self.ctx.broadcaster.publish(&update).await;
        debug!(clients, "Published alert update");
    }
}
