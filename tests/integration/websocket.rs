//! Live `/ws` channel over a real socket

use std::time::Duration;

use futures_util::StreamExt;
use pricewatch::core::create_router;
use pricewatch::models::Target;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::test_utils::TestApp;

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn serve(app: &TestApp) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("ws://{}/ws", addr)
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn client_receives_welcome_snapshot_and_updates() {
    let app = TestApp::new();
    let url = serve(&app).await;

    let (mut client, _) = connect_async(url).await.unwrap();

    let welcome = next_json(&mut client).await;
    assert_eq!(welcome["type"], "connection");

    let snapshot = next_json(&mut client).await;
    assert_eq!(snapshot["type"], "alertUpdate");
    assert!(snapshot["alertStatus"].as_array().unwrap().is_empty());

    let alert = serde_json::from_value(serde_json::json!({
        "symbol": "AAPL",
        "kind": "price",
        "direction": "above",
        "threshold": 100
    }))
    .unwrap();
    app.runtime.context().registry.add(alert).await.unwrap();
    app.market.set_price(Target::stock("AAPL"), 105.0).await;
    app.runtime.run_pass().await;

    let update = next_json(&mut client).await;
    assert_eq!(update["type"], "alertUpdate");
    assert_eq!(update["alertStatus"][0]["symbol"], "AAPL");
    assert_eq!(update["alertStatus"][0]["notified"], true);
    assert_eq!(update["alertHistory"].as_array().unwrap().len(), 1);
    assert!(app.metrics.websocket_clients.get() >= 1);
}

#[tokio::test]
async fn wrong_api_key_is_rejected() {
    let app = TestApp::with_ws_api_key(Some("secret".to_string()));
    let url = serve(&app).await;

    let (mut client, _) = connect_async(format!("{url}?apiKey=wrong")).await.unwrap();
    let error = next_json(&mut client).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["message"], "Unauthorized");

    let (mut client, _) = connect_async(format!("{url}?apiKey=secret")).await.unwrap();
    let welcome = next_json(&mut client).await;
    assert_eq!(welcome["type"], "connection");
}
