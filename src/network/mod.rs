//! Network Layer
//!
//! WebSocket gateway and room relay.
//! Game rules live in `game/`; this layer only moves messages.

pub mod protocol;
pub mod relay;
pub mod rooms;
pub mod server;

pub use protocol::{
    ClientMessage, ServerMessage, ServerError, ErrorCode, EventKind, RoomEvent, RoomId,
};
pub use relay::{relay, RoomRelay, UnknownEventPolicy};
pub use rooms::{RoomHub, DEFAULT_ROOM_CAPACITY};
pub use server::{GameServer, GameServerError};
