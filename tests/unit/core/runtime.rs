//! Unit tests for the evaluation pass

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pricewatch::core::{AlertRuntime, EngineContext};
use pricewatch::error::NotifyError;
use pricewatch::models::{
    Alert, Channel, ChannelKind, Condition, LevelDirection, MarketDataHints, NotifyTarget, Target,
};
use pricewatch::services::market_data::{MarketDataProvider, Quote, StaticMarketDataProvider};
use pricewatch::services::notifications::{Dispatcher, Notifier};
use pricewatch::services::users::InMemoryUserDirectory;

use crate::support::{email_user, engine, engine_with, price_alert, RecordingNotifier};

#[tokio::test]
async fn test_price_alert_episode_end_to_end() {
    let engine = engine();
    let ctx = engine.runtime.context();
    let aapl = Target::stock("AAPL");
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 100.0))
        .await
        .unwrap();

    engine.market.set_price(aapl.clone(), 105.0).await;
    engine.runtime.run_pass().await;
    let history = ctx.history.list(10).await;
    assert_eq!(history.len(), 1);
    assert!(history[0].message.contains("AAPL"));
    assert!(history[0].message.contains("105"));
    assert_eq!(history[0].price, Some(105.0));

    engine.runtime.run_pass().await;
    assert_eq!(ctx.history.len().await, 1);

    engine.market.set_price(aapl.clone(), 95.0).await;
    engine.runtime.run_pass().await;
    assert_eq!(ctx.history.len().await, 1);
    assert!(!ctx.registry.get_at(0).await.unwrap().notified());

    engine.market.set_price(aapl, 101.0).await;
    let summary = engine.runtime.run_pass().await;
    assert_eq!(summary.triggered, 1);
    assert_eq!(ctx.history.len().await, 2);
}

#[tokio::test]
async fn test_unavailable_price_skips_alert() {
    let engine = engine();
    let ctx = engine.runtime.context();
    ctx.registry
        .add(price_alert("NOPE", LevelDirection::Above, 1.0))
        .await
        .unwrap();

    let summary = engine.runtime.run_pass().await;
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.evaluated, 0);

    let alert = ctx.registry.get_at(0).await.unwrap();
    assert!(alert.series.history.is_empty());
    assert!(alert.last_evaluated_at().is_some());
    assert!(ctx.history.is_empty().await);
}

#[tokio::test]
async fn test_buffers_grow_and_status_updates() {
    let engine = engine();
    let ctx = engine.runtime.context();
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 1_000.0))
        .await
        .unwrap();

    engine
        .market
        .set_quote(Target::stock("AAPL"), Quote::new(10.0).with_range(12.0, 9.0).with_volume(300.0))
        .await;
    engine.runtime.run_pass().await;
    engine.runtime.run_pass().await;

    let alert = ctx.registry.get_at(0).await.unwrap();
    assert_eq!(alert.series.history, vec![10.0, 10.0]);
    assert_eq!(alert.series.highs, vec![12.0, 12.0]);
    assert_eq!(alert.series.lows, vec![9.0, 9.0]);
    assert_eq!(alert.series.volumes, vec![300.0, 300.0]);
    assert_eq!(alert.last_price(), Some(10.0));

    let status = &engine.runtime.statuses().await[0];
    assert_eq!(status.last_price, Some(10.0));
    assert!(!status.last_triggered);
    assert!(status.last_error.is_none());
}

#[tokio::test]
async fn test_trigger_delivers_to_every_channel_and_records_successes() {
    let engine = engine_with(RecordingNotifier::failing(&[ChannelKind::Discord]), Vec::new());
    let ctx = engine.runtime.context();
    let user = pricewatch::models::User {
        email: Some("trader@example.com".to_string()),
        discord: Some("https://discord.test/webhook".to_string()),
        ..Default::default()
    };
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 100.0).with_notify(NotifyTarget::User(user)))
        .await
        .unwrap();

    engine.market.set_price(Target::stock("AAPL"), 120.0).await;
    engine.runtime.run_pass().await;

    let event = &ctx.history.list(1).await[0];
    assert_eq!(event.notified_users, vec!["trader@example.com".to_string()]);
    assert_eq!(event.deliveries.len(), 2);
    assert!(!event.test);
    assert_eq!(engine.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_broadcast_alert_resolves_directory() {
    let engine = engine_with(
        RecordingNotifier::default(),
        vec![email_user("a@example.com"), email_user("b@example.com")],
    );
    let ctx = engine.runtime.context();
    ctx.registry
        .add(
            price_alert("AAPL", LevelDirection::Below, 100.0)
                .with_notify(NotifyTarget::Broadcast { all_users: true }),
        )
        .await
        .unwrap();

    engine.market.set_price(Target::stock("AAPL"), 90.0).await;
    engine.runtime.run_pass().await;

    let event = &ctx.history.list(1).await[0];
    assert_eq!(event.notified_users.len(), 2);
    assert_eq!(engine.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_test_trigger_leaves_edge_state_alone() {
    let engine = engine();
    let ctx = engine.runtime.context();
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 100.0).with_notify(NotifyTarget::User(email_user("x@example.com"))))
        .await
        .unwrap();

    let event = engine.runtime.trigger_test(0, false).await.unwrap();
    assert_eq!(event.message, "[TEST] Alert triggered for AAPL");
    assert!(event.price.is_none());
    assert!(event.test);
    assert_eq!(event.notified_users, vec!["x@example.com".to_string()]);
    assert!(engine.notifier.sent().is_empty());

    let alert = ctx.registry.get_at(0).await.unwrap();
    assert!(!alert.notified());
    assert!(engine.runtime.trigger_test(5, false).await.is_err());

    // A real trigger still fires afterwards.
    engine.market.set_price(Target::stock("AAPL"), 101.0).await;
    assert_eq!(engine.runtime.run_pass().await.triggered, 1);
}

#[tokio::test]
async fn test_test_trigger_can_deliver() {
    let engine = engine();
    let ctx = engine.runtime.context();
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 100.0).with_notify(NotifyTarget::User(email_user("x@example.com"))))
        .await
        .unwrap();

    let event = engine.runtime.trigger_test(0, true).await.unwrap();
    assert!(event.deliveries[0].delivered);
    assert_eq!(engine.notifier.sent()[0].2, "[TEST] Alert triggered for AAPL");
}

#[tokio::test]
async fn test_evaluation_error_is_contained() {
    let engine = engine();
    let ctx = engine.runtime.context();
    ctx.registry
        .add(price_alert("BAD", LevelDirection::Above, 100.0))
        .await
        .unwrap();
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 100.0))
        .await
        .unwrap();

    engine.market.set_price(Target::stock("BAD"), f64::NAN).await;
    engine.market.set_price(Target::stock("AAPL"), 150.0).await;
    let summary = engine.runtime.run_pass().await;
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.triggered, 1);

    let failed = ctx.registry.get_at(0).await.unwrap();
    assert!(failed.last_error().unwrap().contains("non-finite"));
    assert!(!failed.notified());
    assert_eq!(ctx.history.len().await, 1);
}

/// Provider that counts fetches per call.
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl MarketDataProvider for CountingProvider {
    async fn get_quote(&self, _target: &Target, _hints: &MarketDataHints) -> Option<Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(Quote::new(50.0))
    }
}

#[tokio::test]
async fn test_one_fetch_per_target_per_pass() {
    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
    });
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(RecordingNotifier::default()), 1));
    let users = Arc::new(InMemoryUserDirectory::default());
    let runtime = AlertRuntime::new(EngineContext::new(provider.clone(), dispatcher, users, 10));

    let registry = &runtime.context().registry;
    registry.add(price_alert("AAPL", LevelDirection::Above, 1.0)).await.unwrap();
    registry.add(price_alert("AAPL", LevelDirection::Below, 1.0)).await.unwrap();
    registry.add(price_alert("MSFT", LevelDirection::Above, 1.0)).await.unwrap();
    registry
        .add(Alert::new(
            Target::stock("AAPL"),
            Condition::Correlation {
                with: Target::stock("MSFT"),
                window: 5,
                direction: LevelDirection::Above,
                threshold: 0.5,
            },
        ))
        .await
        .unwrap();

    runtime.run_pass().await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

    let correlation = registry.get_at(3).await.unwrap();
    assert_eq!(correlation.series.history_b, vec![50.0]);
}

#[tokio::test]
async fn test_pass_publishes_snapshot() {
    let engine = engine();
    let ctx = engine.runtime.context();
    let mut updates = ctx.broadcaster.subscribe();
    ctx.registry
        .add(price_alert("AAPL", LevelDirection::Above, 100.0))
        .await
        .unwrap();
    engine.market.set_price(Target::stock("AAPL"), 105.0).await;

    engine.runtime.run_pass().await;

    let payload = updates.recv().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value["type"], "alertUpdate");
    assert_eq!(value["alertStatus"][0]["symbol"], "AAPL");
    assert_eq!(value["alertStatus"][0]["notified"], true);
    assert_eq!(value["alertHistory"].as_array().unwrap().len(), 1);
    assert!(value["timestamp"].is_string());
}

/// Panics when asked to deliver to `panic@example.com`.
#[derive(Default)]
struct PanickingNotifier {
    delivered: AtomicUsize,
}

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn deliver(&self, channel: &Channel, _subject: &str, _message: &str) -> Result<(), NotifyError> {
        if channel.recipient() == "panic@example.com" {
            panic!("notifier blew up");
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_panicking_alert_does_not_abort_pass() {
    let market = Arc::new(StaticMarketDataProvider::new());
    let notifier = Arc::new(PanickingNotifier::default());
    let dispatcher = Arc::new(Dispatcher::new(notifier.clone(), 1));
    let users = Arc::new(InMemoryUserDirectory::default());
    let runtime = AlertRuntime::new(EngineContext::new(market.clone(), dispatcher, users, 10));

    let registry = &runtime.context().registry;
    registry
        .add(
            price_alert("AAPL", LevelDirection::Above, 100.0)
                .with_notify(NotifyTarget::User(email_user("panic@example.com"))),
        )
        .await
        .unwrap();
    registry
        .add(
            price_alert("MSFT", LevelDirection::Above, 100.0)
                .with_notify(NotifyTarget::User(email_user("ok@example.com"))),
        )
        .await
        .unwrap();
    market.set_price(Target::stock("AAPL"), 105.0).await;
    market.set_price(Target::stock("MSFT"), 105.0).await;

    let summary = runtime.run_pass().await;
    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.triggered, 1);
    assert_eq!(notifier.delivered.load(Ordering::SeqCst), 1);

    let history = runtime.context().history.list(10).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].alert.label(), "MSFT");
}
