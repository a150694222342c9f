//! # Built-in subscribers
//!
//! Small, self-contained implementations useful for demos and debugging.
//!
//! - [`LogWriter`]: logs every aggregated event through `tracing`.

mod log;

pub use log::LogWriter;
