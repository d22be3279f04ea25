//! WebSocket sessions: snapshot streaming plus the inbound command channel.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use orbit_ephemeris::{get_body, parse_body, BodyId};
use tokio::sync::broadcast;

use crate::protocol::{BodyInfo, Command, ControlAction, ServerMessage};
use crate::state::AppState;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Per-session bookkeeping; the egress ring itself lives in the broadcast
/// receiver handed out by the engine.
struct Session {
    id: u64,
    subscribed: bool,
    focus: Option<BodyId>,
    dropped_snapshots: u64,
}

/// `GET /ws/engine` upgrade entry point.
pub async fn ws_engine(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

async fn handle_session(socket: WebSocket, state: AppState) {
    let mut session = Session {
        id: SESSION_COUNTER.fetch_add(1, Ordering::Relaxed),
        subscribed: true,
        focus: None,
        dropped_snapshots: 0,
    };
    tracing::info!(session = session.id, "observer connected");

    let (mut sink, mut stream) = socket.split();
    let mut snapshots = state.engine.subscribe();
    let mut shutdown = state.shutdown.clone();

    // Connection hello, then the current state so new observers render
    // immediately instead of waiting out a tick.
    let hello = ServerMessage::Status {
        message: "WebSocket connected successfully",
    }
    .to_json();
    if sink.send(Message::Text(hello)).await.is_err() {
        return;
    }
    if let Some(snapshot) = state.engine.latest() {
        let message = ServerMessage::StateUpdate { data: snapshot.as_ref() }.to_json();
        if sink.send(Message::Text(message)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match handle_command(&state, &mut session, &text).await {
                            CommandOutcome::Reply(reply) => {
                                if sink.send(Message::Text(reply)).await.is_err() {
                                    break;
                                }
                            }
                            CommandOutcome::Silent => {}
                            CommandOutcome::Terminate(reply) => {
                                let _ = sink.send(Message::Text(reply)).await;
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Binary(_))) => {
                        let reply = ServerMessage::Error {
                            error: "ProtocolError",
                            message: "binary frames are not part of the protocol".to_string(),
                        }
                        .to_json();
                        let _ = sink.send(Message::Text(reply)).await;
                        break;
                    }
                    // Ping/pong keepalives are handled by the transport.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(session = session.id, error = %err, "socket read failed");
                        break;
                    }
                }
            }
            published = snapshots.recv() => {
                match published {
                    Ok(snapshot) => {
                        if !session.subscribed {
                            continue;
                        }
                        let message = ServerMessage::StateUpdate { data: snapshot.as_ref() }.to_json();
                        if sink.send(Message::Text(message)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Slow observers lose snapshots, never the simulation.
                        session.dropped_snapshots += skipped;
                        tracing::debug!(
                            session = session.id,
                            skipped,
                            total = session.dropped_snapshots,
                            "session egress overflow"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!(
        session = session.id,
        dropped_snapshots = session.dropped_snapshots,
        focus = ?session.focus,
        "observer disconnected"
    );
}

enum CommandOutcome {
    Reply(String),
    Silent,
    /// Protocol violation: answer once, then close the session.
    Terminate(String),
}

async fn handle_command(state: &AppState, session: &mut Session, text: &str) -> CommandOutcome {
    let command: Command = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(err) => {
            return CommandOutcome::Terminate(
                ServerMessage::Error {
                    error: "ProtocolError",
                    message: format!("malformed command: {err}"),
                }
                .to_json(),
            );
        }
    };

    match command {
        Command::Control { action, speed } => match action {
            ControlAction::Play => match state.engine.play().await {
                Ok(()) => CommandOutcome::Reply(
                    ServerMessage::Status { message: "Playing" }.to_json(),
                ),
                Err(err) => CommandOutcome::Reply(error_message(err)),
            },
            ControlAction::Pause => match state.engine.pause().await {
                Ok(()) => CommandOutcome::Reply(
                    ServerMessage::Status { message: "Paused" }.to_json(),
                ),
                Err(err) => CommandOutcome::Reply(error_message(err)),
            },
            ControlAction::SetSpeed => {
                let speed = match speed {
                    Some(speed) => speed,
                    None => {
                        return CommandOutcome::Terminate(
                            ServerMessage::Error {
                                error: "ProtocolError",
                                message: "set_speed requires a speed".to_string(),
                            }
                            .to_json(),
                        );
                    }
                };
                match state.engine.set_speed(speed).await {
                    Ok(()) => CommandOutcome::Reply(
                        ServerMessage::Status {
                            message: &format!("Speed set to {speed}x"),
                        }
                        .to_json(),
                    ),
                    Err(err) => CommandOutcome::Reply(error_message(err)),
                }
            }
        },
        Command::Focus { body } => match parse_body(&body) {
            Ok(id) => {
                session.focus = Some(id);
                let sim_time = state
                    .engine
                    .latest()
                    .map(|snapshot| snapshot.sim_time)
                    .unwrap_or(0.0);
                match BodyInfo::at_sim_time(get_body(id), sim_time) {
                    Ok(info) => CommandOutcome::Reply(
                        ServerMessage::BodyInfo { data: &info }.to_json(),
                    ),
                    Err(err) => CommandOutcome::Reply(
                        ServerMessage::Error {
                            error: err.kind,
                            message: err.message,
                        }
                        .to_json(),
                    ),
                }
            }
            Err(err) => CommandOutcome::Reply(
                ServerMessage::Error {
                    error: err.kind(),
                    message: err.to_string(),
                }
                .to_json(),
            ),
        },
        Command::Subscribe => {
            session.subscribed = true;
            CommandOutcome::Silent
        }
        Command::Unsubscribe => {
            session.subscribed = false;
            CommandOutcome::Silent
        }
    }
}

fn error_message(err: orbit_sim::EngineError) -> String {
    ServerMessage::Error {
        error: err.kind(),
        message: err.to_string(),
    }
    .to_json()
}
