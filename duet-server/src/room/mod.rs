mod join_error;
mod room;
mod room_registry;

pub use join_error::*;
pub use room::*;
pub use room_registry::*;
