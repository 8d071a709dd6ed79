// End-to-end tests for the WebSocket session loop over a real socket

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use fleetwatch::core::hub::{create_hub, SharedHub};
use fleetwatch::core::message::ServerMessage;
use fleetwatch::core::stats::StatsPublisher;
use fleetwatch::handlers::websocket::ws_route;
use fleetwatch::storage::memory::MemoryStatsStore;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(hub: SharedHub) -> SocketAddr {
    let routes = ws_route(hub);
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

async fn connect_client(addr: SocketAddr) -> Client {
    let url = format!("ws://{}/ws", addr);
    let (client, _) = connect_async(url).await.expect("WebSocket handshake failed");
    client
}

async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string()))
        .await
        .expect("failed to send frame");
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("WebSocket error");
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).expect("invalid JSON frame");
        }
    }
}

// Skip past unrelated broadcasts (e.g. stats updates) until a message of
// the wanted type arrives
async fn next_of_type(client: &mut Client, wanted: &str) -> Value {
    for _ in 0..50 {
        let value = next_json(client).await;
        if value["type"] == wanted {
            return value;
        }
    }
    panic!("no '{}' message within 50 frames", wanted);
}

async fn wait_for_active_count(hub: &SharedHub, expected: usize) {
    for _ in 0..250 {
        if hub.active_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "active count never reached {} (now {})",
        expected,
        hub.active_count().await
    );
}

#[tokio::test]
async fn test_subscribe_is_acknowledged_and_stats_follow() {
    let hub = create_hub();
    let addr = start_server(hub.clone()).await;

    let store = Arc::new(MemoryStatsStore::new());
    store.server_added().await;
    store.alert_recorded().await;

    let publisher = StatsPublisher::new(hub.clone(), store, Duration::from_millis(30));
    let handle = publisher.spawn();

    let mut client = connect_client(addr).await;
    send_json(&mut client, json!({"type": "subscribe", "topic": "stats"})).await;

    let ack = next_of_type(&mut client, "subscribed").await;
    assert_eq!(ack["topic"], "stats");

    let update = next_of_type(&mut client, "stats_update").await;
    assert_eq!(update["data"]["totalServers"], 1);
    assert_eq!(update["data"]["activeMonitors"], 3);
    assert_eq!(update["data"]["alertsToday"], 1);
    assert!(update["data"]["timestamp"].is_string());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_ping_gets_exactly_pong() {
    let hub = create_hub();
    let addr = start_server(hub.clone()).await;

    let mut client = connect_client(addr).await;
    wait_for_active_count(&hub, 1).await;

    send_json(&mut client, json!({"type": "ping"})).await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["type"], "pong");

    // No state change: still one registered connection
    assert_eq!(hub.active_count().await, 1);
}

#[tokio::test]
async fn test_malformed_frames_do_not_kill_the_session() {
    let hub = create_hub();
    let addr = start_server(hub.clone()).await;

    let mut client = connect_client(addr).await;

    client
        .send(Message::Text("this is not json".to_string()))
        .await
        .expect("send failed");
    send_json(&mut client, json!({"type": "shout"})).await;
    send_json(&mut client, json!({"type": "subscribe"})).await;

    // The session survived all three bad frames
    send_json(&mut client, json!({"type": "ping"})).await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["type"], "pong");
}

#[tokio::test]
async fn test_unsubscribe_stops_topic_delivery() {
    let hub = create_hub();
    let addr = start_server(hub.clone()).await;

    let mut client = connect_client(addr).await;
    send_json(&mut client, json!({"type": "subscribe", "topic": "alerts"})).await;
    next_of_type(&mut client, "subscribed").await;

    send_json(&mut client, json!({"type": "unsubscribe", "topic": "alerts"})).await;
    let ack = next_of_type(&mut client, "unsubscribed").await;
    assert_eq!(ack["topic"], "alerts");

    let delivered = hub
        .broadcast_to_topic(
            "alerts",
            &ServerMessage::Subscribed {
                topic: "alerts".to_string(),
            },
        )
        .await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn test_abrupt_disconnect_cleans_up() {
    let hub = create_hub();
    let addr = start_server(hub.clone()).await;

    let mut leaving = connect_client(addr).await;
    let _staying = connect_client(addr).await;
    wait_for_active_count(&hub, 2).await;

    send_json(&mut leaving, json!({"type": "subscribe", "topic": "stats"})).await;
    next_of_type(&mut leaving, "subscribed").await;

    leaving.close(None).await.expect("close failed");
    wait_for_active_count(&hub, 1).await;

    // No topic retains a reference to the departed connection
    let delivered = hub.broadcast_to_topic("stats", &ServerMessage::Pong).await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn test_topic_broadcast_reaches_exactly_the_subscribers() {
    let hub = create_hub();
    let addr = start_server(hub.clone()).await;

    let mut first = connect_client(addr).await;
    let mut second = connect_client(addr).await;
    let mut third = connect_client(addr).await;

    send_json(&mut first, json!({"type": "subscribe", "topic": "stats"})).await;
    next_of_type(&mut first, "subscribed").await;
    send_json(&mut second, json!({"type": "subscribe", "topic": "stats"})).await;
    next_of_type(&mut second, "subscribed").await;
    send_json(&mut third, json!({"type": "subscribe", "topic": "alerts"})).await;
    next_of_type(&mut third, "subscribed").await;

    let delivered = hub
        .broadcast_to_topic(
            "stats",
            &ServerMessage::Subscribed {
                topic: "stats".to_string(),
            },
        )
        .await;
    assert_eq!(delivered, 2);

    next_of_type(&mut first, "subscribed").await;
    next_of_type(&mut second, "subscribed").await;

    // The alerts subscriber sees nothing but its own pong
    send_json(&mut third, json!({"type": "ping"})).await;
    let reply = next_json(&mut third).await;
    assert_eq!(reply["type"], "pong");
}
