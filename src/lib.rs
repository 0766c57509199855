//! RoomDream - AI room redesign service
//!
//! Takes a photo of a room plus a style selection and returns a redesigned
//! image from a hosted image model, with per-client rate limiting.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `services`: prompt construction and the prediction submit/poll flow
//! - `ratelimit`: fixed-window limiters (memory, Redis, disabled)
//! - `api`: HTTP services and middleware
//! - `client`: HTTP client and session state for `/generate`
//! - `interfaces`: user interfaces (CLI)
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod ratelimit;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
