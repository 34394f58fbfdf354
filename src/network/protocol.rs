//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are JSON. Room events keep the camelCase field names
//! browser clients already send (`senderId`, `roomId`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::deck::Card;
use crate::game::leaderboard::Score;
use crate::game::theme::{Symbol, Theme, ThemeId};

/// Room identifier. Rooms exist only as channel names.
pub type RoomId = String;

// =============================================================================
// ROOM EVENTS
// =============================================================================

/// Kind of a room event.
///
/// Types outside the known four are kept verbatim in [`EventKind::Other`]
/// so the relay can apply its unknown-event policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Player entered the room.
    Join,
    /// Player left the room.
    Leave,
    /// Player flipped a card.
    Move,
    /// Chat line.
    Chat,
    /// Anything else.
    Other(String),
}

impl EventKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::Move => "move",
            EventKind::Chat => "chat",
            EventKind::Other(name) => name,
        }
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "join" => EventKind::Join,
            "leave" => EventKind::Leave,
            "move" => EventKind::Move,
            "chat" => EventKind::Chat,
            _ => EventKind::Other(name),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// An event published to a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Player that sent the event.
    pub sender_id: String,
    /// Target room.
    pub room_id: RoomId,
    /// Free-form payload; engine text for join/leave.
    #[serde(default)]
    pub content: Value,
    /// Client-side send time in whatever form the client uses.
    /// Opaque to the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl RoomEvent {
    /// Create an event without a client timestamp.
    pub fn new(kind: EventKind, sender_id: impl Into<String>, room_id: impl Into<RoomId>, content: Value) -> Self {
        Self {
            kind,
            sender_id: sender_id.into(),
            room_id: room_id.into(),
            content,
            timestamp: None,
        }
    }
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving a room's events.
    #[serde(rename_all = "camelCase")]
    Subscribe { room_id: RoomId },

    /// Stop receiving a room's events.
    #[serde(rename_all = "camelCase")]
    Unsubscribe { room_id: RoomId },

    /// Publish an event to its room.
    Publish { event: RoomEvent },

    /// List all themes.
    ListThemes,

    /// Fetch one theme.
    #[serde(rename_all = "camelCase")]
    GetTheme { theme_id: ThemeId },

    /// Add a theme to the catalog.
    CreateTheme { name: String, symbols: Vec<Symbol> },

    /// Deal a deck. Without a theme the default fruit deck is dealt.
    #[serde(rename_all = "camelCase")]
    Deal {
        #[serde(default)]
        theme_id: Option<ThemeId>,
        #[serde(default)]
        difficulty: Option<String>,
        #[serde(default)]
        seed: Option<u64>,
    },

    /// Submit a finished game's move count.
    SubmitScore { moves: u32 },

    /// Fetch the leaderboard.
    TopScores,

    /// Ping for latency measurement.
    Ping { timestamp: u64 },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription confirmed.
    #[serde(rename_all = "camelCase")]
    Subscribed { room_id: RoomId },

    /// Unsubscription confirmed.
    #[serde(rename_all = "camelCase")]
    Unsubscribed { room_id: RoomId },

    /// Event relayed from a subscribed room.
    Event { event: RoomEvent },

    /// All themes.
    Themes { themes: Vec<Theme> },

    /// One theme.
    Theme { theme: Theme },

    /// Theme added to the catalog.
    ThemeCreated { theme: Theme },

    /// A dealt deck and the seed that reproduces it.
    Deck { cards: Vec<Card>, seed: u64 },

    /// Score stored.
    ScoreRecorded { score: Score },

    /// Leaderboard.
    TopScores { scores: Vec<Score> },

    /// Pong response.
    #[serde(rename_all = "camelCase")]
    Pong { timestamp: u64, server_time: u64 },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Server error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Build an error message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Frame was not a valid client message.
    InvalidMessage,
    /// Unknown theme id.
    ThemeNotFound,
    /// Theme rejected (empty or duplicate name).
    InvalidTheme,
    /// Backing store failed.
    StoreUnavailable,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
