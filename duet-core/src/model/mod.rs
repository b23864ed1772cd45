mod chat;
mod ice;
mod peer;
mod role;
mod room;
mod signaling;

pub use chat::ChatMessage;
pub use ice::{IceCandidate, IceServerConfig};
pub use peer::PeerId;
pub use role::Role;
pub use room::RoomId;
pub use signaling::{SignalError, SignalMessage};
