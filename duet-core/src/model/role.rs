use serde::{Deserialize, Serialize};
use std::fmt;

/// Negotiation role handed out by the relay once a room holds two peers.
///
/// The anchor (first joiner) becomes the caller and produces the offer,
/// the second joiner becomes the callee and answers it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Caller,
    Callee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Caller => f.write_str("caller"),
            Role::Callee => f.write_str("callee"),
        }
    }
}
