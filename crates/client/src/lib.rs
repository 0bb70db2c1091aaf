//! HTTP consumer for the Movies API.
//!
//! - `config.rs`: base URL and transport settings
//! - `client.rs`: the five CRUD operations (plus lookup by name)
//! - `envelope.rs`: response envelopes and failure classification
//! - `error.rs`: failures that happen before any response exists

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;

pub use client::MoviesClient;
pub use config::ClientConfig;
pub use envelope::{ApiError, ApiResponse, DeleteConfirmation, Payload, Success};
pub use error::ClientError;
