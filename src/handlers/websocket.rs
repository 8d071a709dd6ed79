//! WebSocket upgrade route and per-connection session loop

use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{debug, error, info, warn};
use std::convert::Infallible;
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};
use warp::Filter;

use crate::constants::WS_PATH;
use crate::core::hub::SharedHub;
use crate::core::message::{ClientMessage, ServerMessage};
use crate::error::{FleetWatchError, Result};

/// Build the `/ws` upgrade route
pub fn ws_route(
    hub: SharedHub,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path(WS_PATH)
        .and(warp::ws())
        .and(with_hub(hub))
        .map(|ws: warp::ws::Ws, hub: SharedHub| {
            ws.on_upgrade(move |socket| handle_client(socket, hub))
        })
}

// Helper filter to include the hub in the request
fn with_hub(hub: SharedHub) -> impl Filter<Extract = (SharedHub,), Error = Infallible> + Clone {
    warp::any().map(move || hub.clone())
}

/// Service a single client connection until it disconnects
pub async fn handle_client(ws: WebSocket, hub: SharedHub) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Forward messages from the connection's channel to the WebSocket
    tokio::task::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_tx.send(message).await {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let client_id = hub.register(tx).await;
    info!("Client connected: {}", client_id);

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                if msg.is_close() {
                    break;
                }
                if msg.is_text() {
                    if let Err(e) = process_frame(&msg, &client_id, &hub).await {
                        error!("Error handling frame from {}: {}", client_id, e);
                        break;
                    }
                }
            }
            Err(e) => {
                debug!("WebSocket error for {}: {}", client_id, e);
                break;
            }
        }
    }

    // Single deregistration point: the loop never exits with the
    // connection still registered.
    hub.deregister(&client_id).await;
    info!("Client disconnected: {}", client_id);
}

// Process one inbound control frame
async fn process_frame(msg: &Message, client_id: &str, hub: &SharedHub) -> Result<()> {
    let msg_str = match msg.to_str() {
        Ok(s) => s,
        Err(_) => {
            warn!("Non-text frame from {}, ignoring", client_id);
            return Ok(());
        }
    };

    // A malformed or unknown frame is dropped, never a reason to
    // terminate the connection.
    let parsed = match serde_json::from_str::<ClientMessage>(msg_str) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse message from {}: {}", client_id, e);
            return Ok(());
        }
    };

    match parsed {
        ClientMessage::Subscribe { topic } => match topic.filter(|t| !t.is_empty()) {
            Some(topic) => {
                hub.subscribe(client_id, &topic).await;
                info!("Client {} subscribed to topic: {}", client_id, topic);
                ack(hub, client_id, ServerMessage::Subscribed { topic }).await
            }
            None => {
                debug!("Subscribe without topic from {}, ignoring", client_id);
                Ok(())
            }
        },
        ClientMessage::Unsubscribe { topic } => match topic.filter(|t| !t.is_empty()) {
            Some(topic) => {
                hub.unsubscribe(client_id, &topic).await;
                info!("Client {} unsubscribed from topic: {}", client_id, topic);
                ack(hub, client_id, ServerMessage::Unsubscribed { topic }).await
            }
            None => {
                debug!("Unsubscribe without topic from {}, ignoring", client_id);
                Ok(())
            }
        },
        ClientMessage::Ping => ack(hub, client_id, ServerMessage::Pong).await,
    }
}

// Send an acknowledgement; a failed send means the outbound channel is
// gone and the session loop should wind down.
async fn ack(hub: &SharedHub, client_id: &str, message: ServerMessage) -> Result<()> {
    if hub.send_to(client_id, &message).await {
        Ok(())
    } else {
        Err(FleetWatchError::ConnectionClosed)
    }
}
