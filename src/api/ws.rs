//! Collaboration channel: WebSocket endpoint and per-connection pump.
//!
//! The upgrade is accepted regardless of credentials; events from connections
//! lacking authentication or full access are silently dropped, so an
//! unauthenticated peer learns nothing, not even that it was rejected.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::Response,
};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{ensure_access, resolve_identity, Identity};
use crate::collab::{
    case_id_from_channel, ClientEvent, ConnId, Envelope, EventKind, OutboundEvent, RoomPayload,
};
use crate::models::AccessLevel;
use crate::AppState;

/// GET /case/ws - Upgrade to the collaboration channel.
pub async fn collab_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
) -> Response {
    let identity = match resolve_identity(&state, &headers).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::error!("identity resolution failed on ws upgrade: {}", err);
            None
        }
    };

    ws.on_upgrade(move |socket| handle_connection(state, identity, socket))
}

enum RoomSignal {
    Event(Envelope),
    Lagged,
    Closed,
}

async fn room_signal(room: &mut Option<(String, broadcast::Receiver<Envelope>)>) -> RoomSignal {
    match room {
        Some((_, rx)) => match rx.recv().await {
            Ok(envelope) => RoomSignal::Event(envelope),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "collaboration consumer lagged");
                RoomSignal::Lagged
            }
            Err(broadcast::error::RecvError::Closed) => RoomSignal::Closed,
        },
        // Not in a room yet; only inbound traffic can change that.
        None => std::future::pending().await,
    }
}

async fn handle_connection(state: AppState, identity: Option<Identity>, mut socket: WebSocket) {
    let conn_id: ConnId = Uuid::new_v4();
    let mut room: Option<(String, broadcast::Receiver<Envelope>)> = None;

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                let Some(Ok(message)) = inbound else { break };
                let text = match message {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };

                let Ok(event) = serde_json::from_str::<ClientEvent>(text.as_str()) else {
                    continue;
                };

                // Security backstop: no identity, no case channel, or no full
                // access on the case means the event vanishes without a trace.
                let Some(identity) = identity.as_ref() else { continue };
                let payload = payload_of(&event);
                let Some(case_id) = case_id_from_channel(&payload.channel) else { continue };
                if ensure_access(&state, identity, case_id, AccessLevel::FullAccess)
                    .await
                    .is_err()
                {
                    continue;
                }

                match event {
                    ClientEvent::Join(payload) => {
                        let rx = state.collab.join(&payload.channel).await;
                        room = Some((payload.channel.clone(), rx));

                        let notice = OutboundEvent {
                            kind: EventKind::Join,
                            data: serde_json::json!({
                                "channel": payload.channel.clone(),
                                "message": format!("{} just joined", identity.user.login),
                            }),
                        };
                        state.collab.publish(&payload.channel, notice, None).await;
                    }
                    ClientEvent::Change(payload) => {
                        let event = OutboundEvent {
                            kind: EventKind::Change,
                            data: annotated(&payload, "last_change", &identity.user.login),
                        };
                        state
                            .collab
                            .publish(&payload.channel, event, Some(conn_id))
                            .await;
                    }
                    ClientEvent::Save(payload) => {
                        let event = OutboundEvent {
                            kind: EventKind::Save,
                            data: annotated(&payload, "last_saved", &identity.user.login),
                        };
                        state
                            .collab
                            .publish(&payload.channel, event, Some(conn_id))
                            .await;
                    }
                    ClientEvent::ClearBuffer(payload) => {
                        // Everyone discards local drafts, the originator too.
                        let mut data = payload.rest.clone();
                        data.insert("channel".to_string(), serde_json::json!(payload.channel));
                        let event = OutboundEvent {
                            kind: EventKind::ClearBuffer,
                            data: serde_json::Value::Object(data),
                        };
                        state.collab.publish(&payload.channel, event, None).await;
                    }
                }
            }
            signal = room_signal(&mut room) => {
                match signal {
                    RoomSignal::Event(envelope) => {
                        if envelope.exclude == Some(conn_id) {
                            continue;
                        }
                        let Ok(frame) = serde_json::to_string(&envelope.event) else { continue };
                        if socket.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    RoomSignal::Lagged => continue,
                    RoomSignal::Closed => room = None,
                }
            }
        }
    }
}

fn payload_of(event: &ClientEvent) -> &RoomPayload {
    match event {
        ClientEvent::Change(p)
        | ClientEvent::Save(p)
        | ClientEvent::ClearBuffer(p)
        | ClientEvent::Join(p) => p,
    }
}

/// Rebuild the payload with the editor identity attached, the shape peers see.
fn annotated(payload: &RoomPayload, key: &str, login: &str) -> serde_json::Value {
    let mut data = payload.rest.clone();
    data.insert("channel".to_string(), serde_json::json!(payload.channel));
    data.insert(key.to_string(), serde_json::json!(login));
    serde_json::Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_preserves_payload_and_adds_editor() {
        let payload = RoomPayload {
            channel: "case-7".to_string(),
            rest: serde_json::from_str(r#"{"cursor": 3}"#).unwrap(),
        };

        let data = annotated(&payload, "last_change", "analyst");
        assert_eq!(data["channel"], "case-7");
        assert_eq!(data["cursor"], 3);
        assert_eq!(data["last_change"], "analyst");
    }
}
