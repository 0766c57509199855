//! HTTP API
//!
//! - `services`: route handlers (`/generate`, `/options`, `/health`)
//! - `middleware`: request tracing

pub mod middleware;
pub mod services;
