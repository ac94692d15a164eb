pub mod providers;
pub mod relay;

pub use relay::{ChatRelay, ChatResult, ErrorKind};
