use duet_core::{IceServerConfig, RoomId};
use duet_core::utils::default_ice_servers;

/// What to ask the media engine for. Both on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay socket, e.g. `ws://127.0.0.1:3000/ws`.
    pub server_url: String,
    pub room_id: RoomId,
    /// Sender name stamped on chat messages; falls back to the relay-assigned peer id.
    pub display_name: Option<String>,
    /// Used until the relay pushes its own `ice-config`.
    pub ice_servers: Vec<IceServerConfig>,
    pub constraints: MediaConstraints,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, room_id: impl Into<RoomId>) -> Self {
        Self {
            server_url: server_url.into(),
            room_id: room_id.into(),
            display_name: None,
            ice_servers: default_ice_servers(),
            constraints: MediaConstraints::default(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
