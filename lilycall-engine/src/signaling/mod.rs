mod http;
mod hub;
mod outbound;
mod telemetry;
mod transport;

pub use http::*;
pub use hub::*;
pub use outbound::*;
pub use telemetry::*;
pub use transport::*;
