mod admission;
mod admission_policy;
mod ws_handler;

pub use admission::*;
pub use admission_policy::*;
pub use ws_handler::*;
