//! System-level utilities
//!
//! - Logging initialization

pub mod logging;

pub use logging::init_logging;
