mod connection;
mod dispatch;
mod peer;

pub use connection::*;
pub use dispatch::*;
pub use peer::*;
