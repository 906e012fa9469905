//! Websocket fan-out of feed events.
//!
//! Every socket receives every event — no filtering, no replay. A socket
//! that falls far enough behind to lag the channel just misses those events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::config::AppState;
use crate::hub::FeedHub;

/// GET /feed/subscribe
pub async fn feed_subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub.clone()))
}

async fn handle_socket(socket: WebSocket, hub: Arc<FeedHub>) {
    let mut rx = hub.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("feed subscriber connected ({} total)", hub.subscriber_count());

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("failed to serialize feed event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("feed subscriber lagged, {} events dropped", missed);
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Inbound frames carry nothing; the channel is one-way.
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("feed subscriber disconnected");
}
