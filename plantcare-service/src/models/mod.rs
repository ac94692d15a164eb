//! Request and response bodies of the relay's HTTP surface.

pub mod chat;
pub mod debug;

pub use chat::{ChatRequest, StatusResponse};
pub use debug::{DebugInfo, ServerInfo};
