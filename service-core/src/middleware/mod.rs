pub mod request_id;
pub mod request_log;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use request_log::{
    BodySnapshot, MemorySink, RequestLog, RequestLogEntry, RequestLogSink, TracingSink,
    request_log_middleware,
};
