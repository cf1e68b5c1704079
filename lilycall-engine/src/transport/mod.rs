mod peer_event;
mod peer_link;
mod rtc_peer;
mod states;

pub use peer_event::*;
pub use peer_link::*;
pub use rtc_peer::*;
pub use states::*;
