//! `movies-core`: the Movie entity shared by the HTTP client and the event consumer.
//!
//! This crate is **pure domain**: no IO, no async, no transport concerns.

pub mod error;
pub mod id;
pub mod movie;

pub use error::{DomainError, DomainResult};
pub use id::MovieId;
pub use movie::{Movie, MovieDraft, MovieUpdate};
