//! Shared dependencies of the evaluation engine.

use std::sync::Arc;

use crate::alerts::{AlertHistory, AlertRegistry};
use crate::metrics::Metrics;
use crate::services::market_data::MarketDataProvider;
use crate::services::notifications::Dispatcher;
use crate::services::users::UserDirectory;
use crate::services::websocket::AlertBroadcaster;

/// Everything a scheduler pass, a REST handler or a WebSocket session needs.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct EngineContext {
    pub registry: Arc<AlertRegistry>,
    pub history: Arc<AlertHistory>,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub dispatcher: Arc<Dispatcher>,
    pub users: Arc<dyn UserDirectory>,
    pub broadcaster: Arc<AlertBroadcaster>,
    pub metrics: Option<Arc<Metrics>>,
    /// Number of recent events included in each live snapshot.
    pub broadcast_history: usize,
}

impl EngineContext {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        dispatcher: Arc<Dispatcher>,
        users: Arc<dyn UserDirectory>,
        history_capacity: usize,
    ) -> Self {
        Self {
            registry: Arc::new(AlertRegistry::new()),
            history: Arc::new(AlertHistory::new(history_capacity)),
            market_data,
            dispatcher,
            users,
            broadcaster: Arc::new(AlertBroadcaster::new()),
            metrics: None,
            broadcast_history: 10,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_broadcast_history(mut self, broadcast_history: usize) -> Self {
        self.broadcast_history = broadcast_history;
        self
    }
}
