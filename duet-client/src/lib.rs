mod chat;
mod client;
mod config;
mod error;
mod media;
mod negotiation;
mod signaling;

pub use chat::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use signaling::*;
