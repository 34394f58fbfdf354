//! # Memory Match Server
//!
//! Backend for a pairs-matching memory card game: theme catalog, deck
//! dealing, a moves leaderboard and real-time room relay.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   MEMORY MATCH SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  └── rng.rs      - Seedable Xorshift128+ shuffle RNG         │
//! │                                                              │
//! │  game/           - Game logic                                │
//! │  ├── theme.rs    - Theme catalog and default themes          │
//! │  ├── deck.rs     - Deck generation and difficulty            │
//! │  └── leaderboard.rs - Scores ranked by fewest moves          │
//! │                                                              │
//! │  store/          - Persistence                               │
//! │  └── memory.rs   - In-process theme and score tables         │
//! │                                                              │
//! │  network/        - Networking                                │
//! │  ├── server.rs   - WebSocket server                          │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── relay.rs    - Room event transformation                 │
//! │  └── rooms.rs    - Per-room broadcast channels               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reproducible Deals
//!
//! Every deal reports the seed it was shuffled with. Dealing again with
//! the same seed, theme and difficulty yields the identical deck.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig};
pub use core::rng::DeckRng;
pub use game::deck::{Card, Difficulty};
pub use game::leaderboard::{Leaderboard, Score};
pub use game::theme::{Theme, ThemeCatalog};
pub use network::server::{GameServer, GameServerError};
pub use store::{MemoryStore, ScoreStore, StoreError, ThemeStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
