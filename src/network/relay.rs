//! Room Relay
//!
//! Maps one inbound room event to the event every subscriber of that
//! room receives. Stateless: no membership, turn order or card state is
//! tracked here.

use serde_json::Value;
use tracing::warn;

use crate::network::protocol::{EventKind, RoomEvent};

/// What to do with events of an unrecognized kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownEventPolicy {
    /// Republish unchanged.
    #[default]
    Passthrough,
    /// Log and publish nothing.
    Drop,
}

impl std::str::FromStr for UnknownEventPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passthrough" => Ok(UnknownEventPolicy::Passthrough),
            "drop" => Ok(UnknownEventPolicy::Drop),
            other => Err(format!("unknown event policy '{}'", other)),
        }
    }
}

/// Transform an event for broadcast.
///
/// `join` and `leave` are rebuilt as engine-written notices carrying only
/// type, sender, room and content; every other kind passes through unchanged.
pub fn relay(event: RoomEvent) -> RoomEvent {
    let notice = match event.kind {
        EventKind::Join => format!("Jogador {} entrou na sala", event.sender_id),
        EventKind::Leave => format!("Jogador {} saiu da sala", event.sender_id),
        EventKind::Move | EventKind::Chat | EventKind::Other(_) => return event,
    };

    RoomEvent {
        content: Value::String(notice),
        timestamp: None,
        ..event
    }
}

/// [`relay`] plus the configured unknown-event policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomRelay {
    policy: UnknownEventPolicy,
}

impl RoomRelay {
    /// Create a relay with the given policy.
    pub fn new(policy: UnknownEventPolicy) -> Self {
        Self { policy }
    }

    /// Produce the event to publish, or `None` if it is dropped.
    pub fn process(&self, event: RoomEvent) -> Option<RoomEvent> {
        if let EventKind::Other(kind) = &event.kind {
            if self.policy == UnknownEventPolicy::Drop {
                warn!(
                    "Dropping event of unknown type '{}' from {} in room {}",
                    kind, event.sender_id, event.room_id
                );
                return None;
            }
        }
        Some(relay(event))
    }
}
