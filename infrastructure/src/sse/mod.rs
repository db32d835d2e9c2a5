//! Stream Decoder for `text/event-stream` completion responses.
//!
//! - [`lines::LineBuffer`]: UTF-8 safe line reassembly across chunks
//! - [`frame::parse_frame`]: frame classification and delta extraction
//! - [`throttle::Throttle`]: minimum interval between chunk emissions
//! - [`decoder::decode_body`]: drives the above over a response body

pub mod decoder;
pub mod frame;
pub mod lines;
pub mod throttle;

pub use decoder::decode_body;
pub use throttle::DEFAULT_MIN_EMIT_INTERVAL;
