//! Room-based collaboration broadcaster.
//!
//! Connections viewing the same case join a room named `case-<id>` and receive
//! edit events published to it. Rooms are lazily created broadcast channels;
//! membership is a live receiver and dies with the connection. An envelope may
//! exclude one connection id, which that connection's pump filters out (the
//! "everyone but the originator" delivery used by `change` and `save`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Ephemeral identifier of one live connection.
pub type ConnId = Uuid;

/// Per-room broadcast capacity. Slow consumers lag and drop, they never block
/// the publisher.
const ROOM_CAPACITY: usize = 64;

/// Kinds of collaboration events relayed through a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Change,
    Save,
    ClearBuffer,
    Join,
}

/// An event as emitted to room members: `{"event": "...", ...data}`.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEvent {
    #[serde(rename = "event")]
    pub kind: EventKind,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// What actually travels through a room channel.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Connection that must not receive this event, if any.
    pub exclude: Option<ConnId>,
    pub event: OutboundEvent,
}

/// Explicit pub/sub service over per-case rooms.
#[derive(Default)]
pub struct CollabRegistry {
    rooms: RwLock<HashMap<String, broadcast::Sender<Envelope>>>,
}

impl CollabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a room, creating it on first join.
    pub async fn join(&self, room: &str) -> broadcast::Receiver<Envelope> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to a room, optionally excluding one connection.
    /// Returns the number of receivers the envelope reached; a room nobody
    /// has joined receives nothing and is pruned.
    pub async fn publish(
        &self,
        room: &str,
        event: OutboundEvent,
        exclude: Option<ConnId>,
    ) -> usize {
        let delivered = {
            let rooms = self.rooms.read().await;
            match rooms.get(room) {
                Some(tx) => tx.send(Envelope { exclude, event }).unwrap_or(0),
                None => return 0,
            }
        };

        if delivered == 0 {
            // Last member left; drop the empty room.
            let mut rooms = self.rooms.write().await;
            if let Some(tx) = rooms.get(room) {
                if tx.receiver_count() == 0 {
                    rooms.remove(room);
                }
            }
        }

        delivered
    }
}

/// Inbound client frame on the collaboration channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    Change(RoomPayload),
    Save(RoomPayload),
    ClearBuffer(RoomPayload),
    Join(RoomPayload),
}

/// Common payload shape: the target channel plus whatever the client attached.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomPayload {
    pub channel: String,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Extract the case id from a `case-<id>` channel name.
pub fn case_id_from_channel(channel: &str) -> Option<i64> {
    channel.strip_prefix("case-")?.parse().ok()
}

/// Conventional room name for a case.
pub fn case_channel(case_id: i64) -> String {
    format!("case-{}", case_id)
}
