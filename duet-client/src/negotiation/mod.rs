mod candidate_buffer;
mod event;
mod machine;
mod session;
mod state;

pub use candidate_buffer::*;
pub use event::*;
pub use machine::*;
pub use session::*;
pub use state::*;
