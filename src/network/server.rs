//! WebSocket Game Server
//!
//! Async WebSocket gateway in front of the game engine.
//! Answers deck, theme and leaderboard requests, and relays room events
//! between connections subscribed to the same room.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn, error, debug, instrument};

use crate::config::ServerConfig;
use crate::core::rng::DeckRng;
use crate::game::deck::{self, Difficulty};
use crate::game::leaderboard::{Leaderboard, LeaderboardError};
use crate::game::theme::{CatalogError, ThemeCatalog, ThemeId};
use crate::network::protocol::{
    ClientMessage, ServerMessage, ServerError, ErrorCode, RoomEvent, RoomId,
};
use crate::network::relay::RoomRelay;
use crate::network::rooms::RoomHub;
use crate::store::{ScoreStore, ThemeStore};

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// Theme catalog could not be prepared.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl From<&CatalogError> for ServerError {
    fn from(err: &CatalogError) -> Self {
        let code = match err {
            CatalogError::NotFound(_) => ErrorCode::ThemeNotFound,
            CatalogError::EmptyTheme | CatalogError::DuplicateName(_) => ErrorCode::InvalidTheme,
            CatalogError::Store(_) => ErrorCode::StoreUnavailable,
        };
        ServerError::new(code, err.to_string())
    }
}

impl From<&LeaderboardError> for ServerError {
    fn from(err: &LeaderboardError) -> Self {
        ServerError::new(ErrorCode::StoreUnavailable, err.to_string())
    }
}

/// Connected client state.
struct ConnectedClient {
    /// Connection time.
    connected_at: Instant,
}

/// Engine components shared by every connection.
struct Shared<S> {
    catalog: ThemeCatalog<Arc<S>>,
    leaderboard: Leaderboard<Arc<S>>,
    relay: RoomRelay,
    hub: RoomHub,
}

impl<S: ThemeStore + ScoreStore> Shared<S> {
    /// Answer a request that needs no connection state.
    fn respond(&self, msg: ClientMessage) -> Option<ServerMessage> {
        let reply = match msg {
            ClientMessage::ListThemes => match self.catalog.list_themes() {
                Ok(themes) => ServerMessage::Themes { themes },
                Err(e) => ServerMessage::Error((&e).into()),
            },
            ClientMessage::GetTheme { theme_id } => match self.catalog.get_theme(theme_id) {
                Ok(theme) => ServerMessage::Theme { theme },
                Err(e) => ServerMessage::Error((&e).into()),
            },
            ClientMessage::CreateTheme { name, symbols } => match self.catalog.create_theme(&name, symbols) {
                Ok(theme) => ServerMessage::ThemeCreated { theme },
                Err(e) => ServerMessage::Error((&e).into()),
            },
            ClientMessage::Deal { theme_id, difficulty, seed } => {
                self.deal(theme_id, difficulty.as_deref(), seed)
            }
            ClientMessage::SubmitScore { moves } => match self.leaderboard.submit(moves) {
                Ok(score) => ServerMessage::ScoreRecorded { score },
                Err(e) => ServerMessage::Error((&e).into()),
            },
            ClientMessage::TopScores => match self.leaderboard.top_scores() {
                Ok(scores) => ServerMessage::TopScores { scores },
                Err(e) => ServerMessage::Error((&e).into()),
            },
            ClientMessage::Ping { timestamp } => ServerMessage::Pong {
                timestamp,
                server_time: chrono::Utc::now().timestamp_millis().max(0) as u64,
            },
            // Room traffic is connection-scoped
            ClientMessage::Subscribe { .. }
            | ClientMessage::Unsubscribe { .. }
            | ClientMessage::Publish { .. } => return None,
        };
        Some(reply)
    }

    /// Deal a themed deck, or the default deck when no theme is given.
    fn deal(&self, theme_id: Option<ThemeId>, difficulty: Option<&str>, seed: Option<u64>) -> ServerMessage {
        let mut rng = DeckRng::from_seed_or_entropy(seed);
        let cards = match theme_id {
            None => Ok(deck::generate_default(&mut rng)),
            Some(id) => self.catalog.deal(id, Difficulty::parse(difficulty), &mut rng),
        };

        match cards {
            Ok(cards) => ServerMessage::Deck { cards, seed: rng.seed() },
            Err(e) => ServerMessage::Error((&e).into()),
        }
    }

    /// Run an inbound event through the relay and fan it out.
    async fn publish(&self, event: RoomEvent) {
        let Some(outbound) = self.relay.process(event) else {
            return;
        };
        let room_id = outbound.room_id.clone();
        let delivered = self.hub.publish(outbound).await;
        debug!("Relayed event to {} subscribers of room {}", delivered, room_id);
    }
}

/// The game server.
pub struct GameServer<S> {
    /// Server configuration.
    config: ServerConfig,
    /// Engine and room hub.
    shared: Arc<Shared<S>>,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl<S: ThemeStore + ScoreStore + 'static> GameServer<S> {
    /// Create a new game server over a store.
    ///
    /// Seeds the default themes first when configured to.
    pub fn new(config: ServerConfig, store: Arc<S>) -> Result<Self, GameServerError> {
        let catalog = ThemeCatalog::new(store.clone());
        if config.seed_themes {
            catalog.seed_defaults()?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);
        let shared = Shared {
            catalog,
            leaderboard: Leaderboard::new(store),
            relay: RoomRelay::new(config.unknown_events),
            hub: RoomHub::new(config.room_capacity),
        };

        Ok(Self {
            config,
            shared: Arc::new(shared),
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        })
    }

    /// Bind the configured address and run the server.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the server on an already bound listener until shutdown.
    #[instrument(skip(self, listener))]
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Memory match server v{} listening on {}", self.config.version, listener.local_addr()?);

        // Spawn cleanup task
        let cleanup_shared = self.shared.clone();
        let cleanup_every = self.config.cleanup_interval;
        let cleanup_handle = tokio::spawn(async move {
            Self::run_cleanup_loop(cleanup_shared, cleanup_every).await;
        });

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            {
                                let mut clients = self.clients.write().await;
                                if clients.len() >= self.config.max_connections {
                                    warn!("Connection limit reached, rejecting {}", addr);
                                    continue;
                                }
                                // Slot is held from here on, handshake included
                                clients.insert(addr, ConnectedClient {
                                    connected_at: Instant::now(),
                                });
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        cleanup_handle.abort();

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let clients = self.clients.clone();
        let shared = self.shared.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handshake_timeout = self.config.handshake_timeout;

        tokio::spawn(async move {
            let ws_stream = match tokio::time::timeout(handshake_timeout, accept_async(stream)).await {
                Ok(Ok(ws)) => ws,
                Ok(Err(e)) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    clients.write().await.remove(&addr);
                    return;
                }
                Err(_) => {
                    warn!("WebSocket handshake timed out for {}", addr);
                    clients.write().await.remove(&addr);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                let _ = ws_sender.close().await;
            });

            let mut subscriptions: BTreeMap<RoomId, JoinHandle<()>> = BTreeMap::new();

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let client_msg = match ClientMessage::from_json(&text) {
                                    Ok(m) => m,
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        let _ = msg_tx.send(ServerMessage::Error(ServerError::new(
                                            ErrorCode::InvalidMessage,
                                            "Invalid message format",
                                        ))).await;
                                        continue;
                                    }
                                };

                                Self::handle_client_message(
                                    addr,
                                    client_msg,
                                    &shared,
                                    &mut subscriptions,
                                    &msg_tx,
                                ).await;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            for (_, forwarder) in subscriptions {
                forwarder.abort();
            }
            drop(msg_tx);
            // Flush queued replies, but never hang on a stalled socket
            if tokio::time::timeout(Duration::from_secs(1), sender_task).await.is_err() {
                debug!("Sender for {} did not drain in time", addr);
            }

            let connected_for = {
                let mut clients = clients.write().await;
                clients.remove(&addr).map(|c| c.connected_at.elapsed())
            };

            info!("Client {} cleaned up after {:?}", addr, connected_for.unwrap_or_default());
        });
    }

    /// Handle a client message.
    async fn handle_client_message(
        addr: SocketAddr,
        msg: ClientMessage,
        shared: &Arc<Shared<S>>,
        subscriptions: &mut BTreeMap<RoomId, JoinHandle<()>>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        match msg {
            ClientMessage::Subscribe { room_id } => {
                Self::handle_subscribe(addr, room_id, shared, subscriptions, sender).await;
            }
            ClientMessage::Unsubscribe { room_id } => {
                if let Some(forwarder) = subscriptions.remove(&room_id) {
                    forwarder.abort();
                    debug!("Client {} left room {}", addr, room_id);
                }
                let _ = sender.send(ServerMessage::Unsubscribed { room_id }).await;
            }
            ClientMessage::Publish { event } => {
                shared.publish(event).await;
            }
            request => {
                if let Some(reply) = shared.respond(request) {
                    let _ = sender.send(reply).await;
                }
            }
        }
    }

    /// Subscribe a connection to a room.
    ///
    /// The acknowledgement is sent only once the subscription is live, so
    /// anything published after the client sees it will be delivered.
    async fn handle_subscribe(
        addr: SocketAddr,
        room_id: RoomId,
        shared: &Arc<Shared<S>>,
        subscriptions: &mut BTreeMap<RoomId, JoinHandle<()>>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        if !subscriptions.contains_key(&room_id) {
            let mut room_rx = shared.hub.subscribe(&room_id).await;
            let forward_tx = sender.clone();
            let room = room_id.clone();

            let forwarder = tokio::spawn(async move {
                loop {
                    match room_rx.recv().await {
                        Ok(event) => {
                            if forward_tx.send(ServerMessage::Event { event }).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Client {} lagged in room {}, skipped {} events", addr, room, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });

            subscriptions.insert(room_id.clone(), forwarder);
            debug!("Client {} joined room {}", addr, room_id);
        }

        let _ = sender.send(ServerMessage::Subscribed { room_id }).await;
    }

    /// Run cleanup loop.
    async fn run_cleanup_loop(shared: Arc<Shared<S>>, every: Duration) {
        let mut interval = interval(every);

        loop {
            interval.tick().await;
            shared.hub.cleanup().await;
        }
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Get open room count.
    pub async fn room_count(&self) -> usize {
        self.shared.hub.room_count().await
    }
}
