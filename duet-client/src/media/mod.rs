mod peer_connection;
mod webrtc_engine;

pub use peer_connection::*;
pub use webrtc_engine::*;
