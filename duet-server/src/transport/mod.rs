mod turn_relay;

pub use turn_relay::*;
