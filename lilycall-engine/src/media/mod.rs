mod controller;
mod devices;
mod synthetic;
mod track;

pub use controller::*;
pub use devices::*;
pub use synthetic::*;
pub use track::*;
