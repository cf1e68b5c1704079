//! Two-party call session engine for the lilycall coaching platform.
//!
//! The engine owns one peer connection per session, negotiates it with the
//! perfect-negotiation collision rules over an HTTP polling transport, and
//! survives leave/rejoin cycles and transient network failure. The signaling
//! server, booking authorization and UI live outside this crate.

pub mod config;
pub mod error;
pub mod media;
pub mod negotiation;
pub mod session;
pub mod signaling;
pub mod transport;

pub use config::SessionConfig;
pub use error::EngineError;
pub use session::{SessionBuilder, SessionCommand, SessionEvent, SessionHandle};
