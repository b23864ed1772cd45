
pub use gated_signaling::*;
pub use mock_signaling::*;
pub use ws_client::*;
