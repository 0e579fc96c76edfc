//! Rendering of unhandled errors into HAL+JSON responses.
//!
//! - `envelope`: serializable shape of an error + the pluggable wrapping strategy
//! - `log`: the one-line diagnostic sink
//! - `responder`: status/header selection and the final response

pub mod envelope;
pub mod log;
pub mod responder;

pub use envelope::{DefaultErrorWrapper, Diagnostics, ErrorEnvelope, ErrorWrapper};
pub use log::{ErrorLog, MemoryErrorLog, TracingErrorLog};
pub use responder::{ErrorResponder, HAL_JSON};
