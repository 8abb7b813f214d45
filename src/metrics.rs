//! Prometheus metrics for the HTTP surface and the evaluation engine.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Process-wide metric handles backed by a private registry.
pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,

    pub alert_cycles_total: IntCounter,
    pub alert_cycle_duration_seconds: Histogram,
    pub alerts_registered: IntGauge,
    pub alert_evaluations_total: IntCounter,
    pub alert_evaluation_errors_total: IntCounter,
    pub alert_price_unavailable_total: IntCounter,
    pub alerts_triggered_total: IntCounter,
    pub notifications_sent_total: IntCounterVec,
    pub notifications_failed_total: IntCounterVec,
    pub websocket_clients: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;

        let alert_cycles_total =
            IntCounter::new("alert_cycles_total", "Completed scheduler passes")?;
        let alert_cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "alert_cycle_duration_seconds",
                "Wall time of one scheduler pass in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        let alerts_registered = IntGauge::new("alerts_registered", "Alerts currently registered")?;
        let alert_evaluations_total =
            IntCounter::new("alert_evaluations_total", "Alert condition evaluations")?;
        let alert_evaluation_errors_total = IntCounter::new(
            "alert_evaluation_errors_total",
            "Alert evaluations that failed with an error",
        )?;
        let alert_price_unavailable_total = IntCounter::new(
            "alert_price_unavailable_total",
            "Alerts skipped because no price was available",
        )?;
        let alerts_triggered_total =
            IntCounter::new("alerts_triggered_total", "Alert trigger episodes started")?;
        let notifications_sent_total = IntCounterVec::new(
            Opts::new("notifications_sent_total", "Notifications delivered"),
            &["channel"],
        )?;
        let notifications_failed_total = IntCounterVec::new(
            Opts::new("notifications_failed_total", "Notification deliveries that failed"),
            &["channel"],
        )?;
        let websocket_clients =
            IntGauge::new("websocket_clients", "Connected live-update clients")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(alert_cycles_total.clone()))?;
        registry.register(Box::new(alert_cycle_duration_seconds.clone()))?;
        registry.register(Box::new(alerts_registered.clone()))?;
        registry.register(Box::new(alert_evaluations_total.clone()))?;
        registry.register(Box::new(alert_evaluation_errors_total.clone()))?;
        registry.register(Box::new(alert_price_unavailable_total.clone()))?;
        registry.register(Box::new(alerts_triggered_total.clone()))?;
        registry.register(Box::new(notifications_sent_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;
        registry.register(Box::new(websocket_clients.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            alert_cycles_total,
            alert_cycle_duration_seconds,
            alerts_registered,
            alert_evaluations_total,
            alert_evaluation_errors_total,
            alert_price_unavailable_total,
            alerts_triggered_total,
            notifications_sent_total,
            notifications_failed_total,
            websocket_clients,
        })
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
