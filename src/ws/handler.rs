//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::entity::PlayerId;
use crate::game::{Outbound, SessionEvent};
use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = PlayerId::new();
    info!(player_id = %player_id, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    // Subscribe before connecting so no broadcast between the snapshot and
    // the first receive is lost
    let broadcast_rx = state.world.broadcast_tx.subscribe();

    // Register with the world and deliver the initial full snapshot
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let connect = SessionEvent::Connect {
        player_id,
        reply: reply_tx,
    };
    if state.world.event_tx.send(connect).await.is_err() {
        error!(player_id = %player_id, "World task unavailable");
        return;
    }

    match reply_rx.await {
        Ok(game_state) => {
            if let Err(e) = send_msg(&mut ws_sink, &game_state).await {
                error!(player_id = %player_id, error = %e, "Failed to send game state");
                let _ = state
                    .world
                    .event_tx
                    .send(SessionEvent::Disconnect { player_id })
                    .await;
                return;
            }
        }
        Err(_) => {
            error!(player_id = %player_id, "World task dropped connect reply");
            return;
        }
    }

    run_session(player_id, ws_sink, ws_stream, &state, broadcast_rx).await;

    // Cleanup on disconnect
    let _ = state
        .world
        .event_tx
        .send(SessionEvent::Disconnect { player_id })
        .await;

    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: PlayerId,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    state: &AppState,
    mut broadcast_rx: broadcast::Receiver<Outbound>,
) {
    let rate_limiter = PlayerRateLimiter::new();

    // Writer task: world broadcasts -> WebSocket, filtering envelopes
    // addressed to everyone but this connection
    let writer_handle = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(Outbound { skip, msg }) => {
                    if skip == Some(player_id) {
                        continue;
                    }
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(player_id = %player_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        player_id = %player_id,
                        lagged_count = n,
                        "Client lagged, skipping {} broadcasts", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(player_id = %player_id, "Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> world task
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(player_id = %player_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => {
                        let event = match client_msg {
                            ClientMsg::PlayerInput(frame) => {
                                SessionEvent::Input { player_id, frame }
                            }
                            ClientMsg::Respawn => SessionEvent::Respawn { player_id },
                        };

                        if state.world.event_tx.send(event).await.is_err() {
                            debug!(player_id = %player_id, "World channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(player_id = %player_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(player_id = %player_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Abort writer task
    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
