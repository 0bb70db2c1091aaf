//! Where batches of raw messages come from.
//!
//! The broker transport itself lives outside this crate; anything that can
//! hand over `{topic, value}` batches implements [`MessageSource`]. The
//! in-memory [`channel`] pair serves tests and local runs.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::RawMessage;

/// A pull-based supplier of message batches.
///
/// Batches must be yielded in delivery order. `None` means the source is
/// exhausted or closed and no further batches will arrive.
#[async_trait]
pub trait MessageSource: Send {
    async fn next_batch(&mut self) -> Option<Vec<RawMessage>>;
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("message source closed")]
pub struct SourceClosed;

/// Create an in-memory publisher/source pair holding up to `capacity` batches.
pub fn channel(capacity: usize) -> (ChannelPublisher, ChannelSource) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelPublisher { sender }, ChannelSource { receiver })
}

/// Sending half of [`channel`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<Vec<RawMessage>>,
}

impl ChannelPublisher {
    /// Enqueue a batch, waiting while the channel is full.
    pub async fn publish(&self, batch: Vec<RawMessage>) -> Result<(), SourceClosed> {
        self.sender.send(batch).await.map_err(|_| SourceClosed)
    }
}

/// Receiving half of [`channel`]. Closes once every publisher is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<Vec<RawMessage>>,
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn next_batch(&mut self) -> Option<Vec<RawMessage>> {
        self.receiver.recv().await
    }
}

/// A fixed list of batches, drained front to back.
#[async_trait]
impl MessageSource for std::collections::VecDeque<Vec<RawMessage>> {
    async fn next_batch(&mut self) -> Option<Vec<RawMessage>> {
        self.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[tokio::test]
    async fn channel_delivers_in_order_then_closes() {
        let (publisher, mut source) = channel(4);
        publisher.publish(vec![RawMessage::new("movie-created", "1")]).await.unwrap();
        publisher.publish(vec![RawMessage::new("movie-deleted", "2")]).await.unwrap();
        drop(publisher);

        assert_eq!(source.next_batch().await.unwrap()[0].topic, "movie-created");
        assert_eq!(source.next_batch().await.unwrap()[0].topic, "movie-deleted");
        assert!(source.next_batch().await.is_none());
    }

    #[tokio::test]
    async fn publishing_to_a_dropped_source_fails() {
        let (publisher, source) = channel(1);
        drop(source);
        assert_eq!(publisher.publish(Vec::new()).await, Err(SourceClosed));
    }

    #[tokio::test]
    async fn vec_deque_source_drains() {
        let mut source: VecDeque<Vec<RawMessage>> = VecDeque::from(vec![Vec::new()]);
        assert!(source.next_batch().await.is_some());
        assert!(source.next_batch().await.is_none());
    }
}
