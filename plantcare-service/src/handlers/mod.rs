//! HTTP handlers for the relay.

pub mod chat;
pub mod debug;
pub mod status;

pub use chat::chat;
pub use debug::debug;
pub use status::{not_found, root, test_connection};
