//! Movie lifecycle events: decoding, routing and batch consumption.
//!
//! Messages arrive as `{topic, value}` pairs from a [`MessageSource`]. Each one
//! is decoded into a [`MovieEvent`] and routed to the matching
//! [`MovieEventHandler`] method. Bad messages and failing handlers are recorded
//! in a [`BatchReport`]; they never abort the rest of the batch.

pub mod consumer;
pub mod decode;
pub mod event;
pub mod handler;
pub mod source;
pub mod worker;

pub use consumer::{BatchReport, ConsumeFailure, EventConsumer, FailureReason, HandledEvent};
pub use decode::{DecodeError, decode};
pub use event::{EventKind, MovieEvent, MovieEventPayload, RawMessage};
pub use handler::{HandlerError, LoggingHandler, MovieEventHandler, dispatch};
pub use source::{ChannelPublisher, ChannelSource, MessageSource, SourceClosed, channel};
pub use worker::{ConsumerWorker, WorkerHandle, WorkerStats};
