//! Shared fixtures for unit tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pricewatch::core::{AlertRuntime, EngineContext};
use pricewatch::error::NotifyError;
use pricewatch::models::{Alert, Channel, ChannelKind, Condition, LevelDirection, Target, User};
use pricewatch::services::market_data::StaticMarketDataProvider;
use pricewatch::services::notifications::{Dispatcher, Notifier};
use pricewatch::services::users::InMemoryUserDirectory;

/// Notifier that records every delivery and fails the configured kinds.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(ChannelKind, String, String)>>,
    pub failing: HashSet<ChannelKind>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn failing(kinds: &[ChannelKind]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: kinds.iter().copied().collect(),
        }
    }

    pub fn sent(&self) -> Vec<(ChannelKind, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, channel: &Channel, _subject: &str, message: &str) -> Result<(), NotifyError> {
        if self.failing.contains(&channel.kind()) {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.sent.lock().unwrap().push((
            channel.kind(),
            channel.recipient().to_string(),
            message.to_string(),
        ));
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestEngine {
    pub runtime: AlertRuntime,
    pub market: Arc<StaticMarketDataProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub users: Arc<InMemoryUserDirectory>,
}

#[allow(dead_code)]
pub fn engine_with(notifier: RecordingNotifier, users: Vec<User>) -> TestEngine {
    let market = Arc::new(StaticMarketDataProvider::new());
    let notifier = Arc::new(notifier);
    let users = Arc::new(InMemoryUserDirectory::new(users));
    let dispatcher = Arc::new(Dispatcher::new(notifier.clone(), 2));
    let ctx = EngineContext::new(market.clone(), dispatcher, users.clone(), 100);
    TestEngine {
        runtime: AlertRuntime::new(ctx),
        market,
        notifier,
        users,
    }
}

#[allow(dead_code)]
pub fn engine() -> TestEngine {
    engine_with(RecordingNotifier::default(), Vec::new())
}

#[allow(dead_code)]
pub fn email_user(email: &str) -> User {
    User {
        email: Some(email.to_string()),
        ..User::default()
    }
}

#[allow(dead_code)]
pub fn price_alert(symbol: &str, direction: LevelDirection, threshold: f64) -> Alert {
    Alert::new(
        Target::stock(symbol),
        Condition::Price {
            direction,
            threshold,
        },
    )
}
