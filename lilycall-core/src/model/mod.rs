mod ice;
mod role;
mod room;
mod session;
mod signal;

pub use ice::*;
pub use role::*;
pub use room::*;
pub use session::*;
pub use signal::*;
