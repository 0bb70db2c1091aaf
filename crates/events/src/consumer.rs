//! Batch consumption with per-message failure isolation.
//!
//! Messages are handled strictly in arrival order; the next message is not
//! looked at until the previous handler call has finished. That keeps
//! "updated after deleted" for the same id meaningful downstream.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use movies_core::MovieId;

use crate::decode::{DecodeError, decode};
use crate::event::{EventKind, MovieEvent, RawMessage};
use crate::handler::{HandlerError, MovieEventHandler, dispatch};

/// Why one message of a batch was not handled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("handler failed: {0}")]
    Handler(#[from] HandlerError),

    #[error("handler panicked")]
    Panicked,

    #[error("handler task was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledEvent {
    /// Position of the message in its batch.
    pub index: usize,
    pub kind: EventKind,
    pub id: MovieId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeFailure {
    pub index: usize,
    pub topic: String,
    pub reason: FailureReason,
}

/// Outcome of one batch, in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub handled: Vec<HandledEvent>,
    pub failures: Vec<ConsumeFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.handled.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn decode_failures(&self) -> impl Iterator<Item = &ConsumeFailure> {
        self.failures
            .iter()
            .filter(|f| matches!(f.reason, FailureReason::Decode(_)))
    }
}

/// Decodes batches of raw messages and routes them to a [`MovieEventHandler`].
pub struct EventConsumer<H> {
    handler: Arc<H>,
}

impl<H> Clone for EventConsumer<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H> EventConsumer<H>
where
    H: MovieEventHandler + 'static,
{
    pub fn new(handler: H) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    pub fn from_arc(handler: Arc<H>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Decode and handle every message; never stops early.
    #[instrument(skip_all, fields(batch_size = tracing::field::Empty))]
    pub async fn consume_batch<I>(&self, batch: I) -> BatchReport
    where
        I: IntoIterator<Item = RawMessage>,
    {
        let mut report = BatchReport::default();

        for (index, message) in batch.into_iter().enumerate() {
            let event = match decode(&message) {
                Ok(event) => event,
                Err(err) => {
                    warn!(
                        index,
                        topic = %message.topic,
                        error = %err,
                        "skipping undecodable message"
                    );
                    report.failures.push(ConsumeFailure {
                        index,
                        topic: message.topic,
                        reason: err.into(),
                    });
                    continue;
                }
            };

            let (kind, id) = (event.kind, event.id());
            match self.handle_isolated(event).await {
                Ok(()) => {
                    debug!(index, %kind, %id, "event handled");
                    report.handled.push(HandledEvent { index, kind, id });
                }
                Err(reason) => {
                    warn!(index, %kind, %id, error = %reason, "event handler failed");
                    report.failures.push(ConsumeFailure {
                        index,
                        topic: message.topic,
                        reason,
                    });
                }
            }
        }

        tracing::Span::current().record("batch_size", report.total());
        info!(
            handled = report.handled.len(),
            failed = report.failures.len(),
            "batch consumed"
        );
        report
    }

    /// Run one handler call on its own task so a panic stays contained.
    async fn handle_isolated(&self, event: MovieEvent) -> Result<(), FailureReason> {
        let handler = Arc::clone(&self.handler);
        let task = tokio::spawn(async move { dispatch(handler.as_ref(), &event).await });

        match task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(FailureReason::Handler(err)),
            Err(join) if join.is_panic() => Err(FailureReason::Panicked),
            Err(_) => Err(FailureReason::Cancelled),
        }
    }
}
