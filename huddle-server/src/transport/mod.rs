mod frame;
mod transport_config;

pub use frame::*;
pub use transport_config::*;
