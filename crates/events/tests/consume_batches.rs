use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use movies_core::MovieId;
use movies_events::{
    ConsumerWorker, EventConsumer, EventKind, HandlerError, LoggingHandler, MovieEvent,
    MovieEventHandler, MovieEventPayload, RawMessage, WorkerStats, channel,
};

/// Downstream read model kept in sync from events.
#[derive(Default)]
struct Catalog {
    movies: Mutex<BTreeMap<MovieId, MovieEventPayload>>,
}

impl Catalog {
    fn snapshot(&self) -> BTreeMap<MovieId, MovieEventPayload> {
        self.movies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieEventHandler for Catalog {
    async fn on_created(&self, event: &MovieEvent) -> Result<(), HandlerError> {
        let mut movies = self.movies.lock().unwrap();
        if movies.contains_key(&event.id()) {
            return Err(HandlerError::new(format!("movie {} already exists", event.id())));
        }
        movies.insert(event.id(), event.payload.clone());
        Ok(())
    }

    async fn on_updated(&self, event: &MovieEvent) -> Result<(), HandlerError> {
        let mut movies = self.movies.lock().unwrap();
        match movies.get_mut(&event.id()) {
            Some(existing) => {
                *existing = event.payload.clone();
                Ok(())
            }
            None => Err(HandlerError::new(format!("movie {} not found", event.id()))),
        }
    }

    async fn on_deleted(&self, event: &MovieEvent) -> Result<(), HandlerError> {
        self.movies.lock().unwrap().remove(&event.id());
        Ok(())
    }
}

fn event(kind: EventKind, id: i64, name: &str, year: i32) -> RawMessage {
    RawMessage::new(
        kind.topic(),
        json!({ "id": id, "name": name, "year": year }).to_string(),
    )
    .with_key(id.to_string())
}

#[tokio::test]
async fn worker_keeps_catalog_in_sync_across_batches() {
    let catalog = Arc::new(Catalog::default());
    let consumer = EventConsumer::from_arc(Arc::clone(&catalog));
    let (publisher, source) = channel(8);
    let worker = ConsumerWorker::spawn("catalog-sync", source, consumer);

    publisher
        .publish(vec![
            event(EventKind::Created, 1, "The Matrix", 1999),
            event(EventKind::Created, 2, "Heat", 1995),
            RawMessage::new("movie-created", "{\"id\": 3,"),
        ])
        .await
        .unwrap();
    publisher
        .publish(vec![
            event(EventKind::Updated, 1, "The Matrix Reloaded", 2003),
            event(EventKind::Deleted, 2, "Heat", 1995),
            event(EventKind::Updated, 2, "Heat", 1996),
            RawMessage::new("movie-archived", "{}"),
        ])
        .await
        .unwrap();
    drop(publisher);

    let stats = worker.join().await.unwrap();

    assert_eq!(
        stats,
        WorkerStats {
            batches: 2,
            handled: 4,
            failed: 3,
        }
    );

    let movies = catalog.snapshot();
    assert_eq!(movies.len(), 1);
    let matrix = &movies[&MovieId::new(1)];
    assert_eq!((matrix.name.as_str(), matrix.year), ("The Matrix Reloaded", 2003));
}

#[tokio::test]
async fn shutdown_stops_an_idle_worker() {
    let (publisher, source) = channel(1);
    let worker = ConsumerWorker::spawn("idle", source, EventConsumer::new(LoggingHandler));

    let stats = worker.shutdown().await.unwrap();

    assert_eq!(stats, WorkerStats::default());
    drop(publisher);
}

#[tokio::test]
async fn dropping_the_handle_stops_the_worker() {
    let (publisher, source) = channel(1);
    let worker = ConsumerWorker::spawn("detached", source, EventConsumer::new(LoggingHandler));

    drop(worker);

    // The source is dropped with the worker task, which closes the channel.
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while publisher.publish(Vec::new()).await.is_ok() {
            tokio::task::yield_now().await;
        }
    })
    .await;

    assert!(closed.is_ok(), "worker kept running after its handle was dropped");
}

#[tokio::test]
async fn fixed_batches_drain_through_the_worker() {
    let batches: VecDeque<Vec<RawMessage>> = VecDeque::from(vec![
        vec![event(EventKind::Created, 10, "Alien", 1979)],
        vec![event(EventKind::Deleted, 10, "Alien", 1979)],
    ]);
    let catalog = Arc::new(Catalog::default());

    let consumer = EventConsumer::from_arc(Arc::clone(&catalog));
    let stats = ConsumerWorker::spawn("fixed", batches, consumer)
        .join()
        .await
        .unwrap();

    assert_eq!(stats.handled, 2);
    assert!(catalog.snapshot().is_empty());
}
