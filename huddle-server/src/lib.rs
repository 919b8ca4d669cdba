mod peer;
mod room;
mod signaling;
mod transport;

pub use peer::*;
pub use room::*;
pub use signaling::*;
pub use transport::*;
