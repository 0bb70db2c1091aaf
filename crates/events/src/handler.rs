use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::event::{EventKind, MovieEvent};

/// Failure raised by a downstream handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_error(err: impl std::error::Error) -> Self {
        Self::new(err.to_string())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Per-kind reaction to decoded movie events.
///
/// Each [`EventKind`] maps to exactly one method; routing is a `match` in
/// [`dispatch`], not a lookup by topic string. Implementations own any side
/// effects (persistence, cache invalidation, downstream sync).
#[async_trait]
pub trait MovieEventHandler: Send + Sync {
    async fn on_created(&self, event: &MovieEvent) -> Result<(), HandlerError>;

    async fn on_updated(&self, event: &MovieEvent) -> Result<(), HandlerError>;

    async fn on_deleted(&self, event: &MovieEvent) -> Result<(), HandlerError>;
}

/// Route an event to the handler method for its kind.
pub async fn dispatch<H>(handler: &H, event: &MovieEvent) -> Result<(), HandlerError>
where
    H: MovieEventHandler + ?Sized,
{
    match event.kind {
        EventKind::Created => handler.on_created(event).await,
        EventKind::Updated => handler.on_updated(event).await,
        EventKind::Deleted => handler.on_deleted(event).await,
    }
}

/// Handler that only logs what it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl MovieEventHandler for LoggingHandler {
    async fn on_created(&self, event: &MovieEvent) -> Result<(), HandlerError> {
        info!(
            id = %event.id(),
            name = %event.payload.name,
            year = event.payload.year,
            "movie created"
        );
        Ok(())
    }

    async fn on_updated(&self, event: &MovieEvent) -> Result<(), HandlerError> {
        info!(
            id = %event.id(),
            name = %event.payload.name,
            year = event.payload.year,
            "movie updated"
        );
        Ok(())
    }

    async fn on_deleted(&self, event: &MovieEvent) -> Result<(), HandlerError> {
        info!(id = %event.id(), "movie deleted");
        Ok(())
    }
}
