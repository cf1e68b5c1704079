pub mod harness;

pub use fake_peer::*;
pub use harness::*;
