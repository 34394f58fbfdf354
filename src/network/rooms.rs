//! Room Hub
//!
//! Publish/subscribe fan-out keyed by room id. Each room is a bounded
//! broadcast channel created on first subscription. The hub keeps no
//! membership list beyond the channel's live receivers.

use std::collections::BTreeMap;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::network::protocol::{RoomEvent, RoomId};

/// Default per-room buffer before slow subscribers start lagging.
pub const DEFAULT_ROOM_CAPACITY: usize = 256;

/// Manages all room channels.
pub struct RoomHub {
    /// Channel per room.
    rooms: RwLock<BTreeMap<RoomId, broadcast::Sender<RoomEvent>>>,
    /// Buffer size for new channels.
    capacity: usize,
}

impl RoomHub {
    /// Create a hub whose rooms buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(BTreeMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a room, creating its channel if needed.
    pub async fn subscribe(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        {
            let rooms = self.rooms.read().await;
            if let Some(tx) = rooms.get(room_id) {
                return tx.subscribe();
            }
        }

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!("Opened room {}", room_id);
                broadcast::channel(self.capacity).0
            })
            .subscribe()
    }

    /// Publish to every current subscriber of `event.room_id`.
    ///
    /// Returns the number of receivers the event was queued for.
    pub async fn publish(&self, event: RoomEvent) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(&event.room_id) {
            // Err only when every receiver is gone
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Number of live subscribers in a room.
    pub async fn subscriber_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|tx| tx.receiver_count()).unwrap_or(0)
    }

    /// Number of open room channels.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drop channels nobody listens to any more.
    pub async fn cleanup(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, tx| tx.receiver_count() > 0);
        let removed = before - rooms.len();
        if removed > 0 {
            debug!("Closed {} empty rooms", removed);
        }
        removed
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::protocol::EventKind;
    use serde_json::json;

    fn chat(room: &str, text: &str) -> RoomEvent {
        RoomEvent::new(EventKind::Chat, "p1", room, json!({ "text": text }))
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let hub = RoomHub::default();
        let mut a = hub.subscribe("r1").await;
        let mut b = hub.subscribe("r1").await;

        assert_eq!(hub.publish(chat("r1", "oi")).await, 2);
        assert_eq!(a.recv().await.unwrap(), chat("r1", "oi"));
        assert_eq!(b.recv().await.unwrap(), chat("r1", "oi"));
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let hub = RoomHub::default();
        let mut r1 = hub.subscribe("r1").await;
        let _r2 = hub.subscribe("r2").await;

        hub.publish(chat("r2", "only r2")).await;
        hub.publish(chat("r1", "only r1")).await;

        assert_eq!(r1.recv().await.unwrap().content["text"], "only r1");
        assert!(r1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = RoomHub::default();
        assert_eq!(hub.publish(chat("nobody", "hello?")).await, 0);
        assert_eq!(hub.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_single_publisher_order() {
        let hub = RoomHub::default();
        let mut rx = hub.subscribe("r1").await;

        for i in 0..20 {
            hub.publish(chat("r1", &i.to_string())).await;
        }
        for i in 0..20 {
            assert_eq!(rx.recv().await.unwrap().content["text"], i.to_string());
        }
    }

    #[tokio::test]
    async fn test_cleanup_removes_empty_rooms() {
        let hub = RoomHub::default();
        let rx = hub.subscribe("r1").await;
        let _keep = hub.subscribe("r2").await;
        assert_eq!(hub.room_count().await, 2);
        assert_eq!(hub.subscriber_count("r1").await, 1);

        drop(rx);
        assert_eq!(hub.cleanup().await, 1);
        assert_eq!(hub.room_count().await, 1);
        assert_eq!(hub.subscriber_count("r1").await, 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let hub = RoomHub::new(2);
        let mut rx = hub.subscribe("r1").await;

        for i in 0..5 {
            hub.publish(chat("r1", &i.to_string())).await;
        }

        assert!(matches!(rx.recv().await, Err(broadcast::error::RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap().content["text"], "3");
    }
}
