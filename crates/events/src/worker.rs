use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::consumer::{BatchReport, EventConsumer};
use crate::handler::MovieEventHandler;
use crate::source::MessageSource;

/// Running totals across all batches a worker consumed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub batches: u64,
    pub handled: u64,
    pub failed: u64,
}

impl WorkerStats {
    fn record(&mut self, report: &BatchReport) {
        self.batches += 1;
        self.handled += report.handled.len() as u64;
        self.failed += report.failures.len() as u64;
    }
}

/// Handle to stop and join a background consumer.
///
/// Dropping the handle without calling [`join`](Self::join) also stops the
/// worker after its current batch.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<WorkerStats>,
}

impl WorkerHandle {
    /// Request shutdown and wait for the in-flight batch to finish.
    pub async fn shutdown(self) -> Result<WorkerStats, JoinError> {
        let _ = self.shutdown.send(());
        self.join.await
    }

    /// Wait until the source is exhausted.
    pub async fn join(self) -> Result<WorkerStats, JoinError> {
        let Self { shutdown, join } = self;
        let stats = join.await;
        drop(shutdown);
        stats
    }
}

/// Background loop: pull a batch, consume it, repeat.
#[derive(Debug)]
pub struct ConsumerWorker;

impl ConsumerWorker {
    /// Spawn a tokio task consuming `source` until it closes or shutdown is requested.
    pub fn spawn<S, H>(name: &'static str, source: S, consumer: EventConsumer<H>) -> WorkerHandle
    where
        S: MessageSource + 'static,
        H: MovieEventHandler + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(worker_loop(name, source, consumer, shutdown_rx));

        WorkerHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

async fn worker_loop<S, H>(
    name: &'static str,
    mut source: S,
    consumer: EventConsumer<H>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> WorkerStats
where
    S: MessageSource,
    H: MovieEventHandler + 'static,
{
    let mut stats = WorkerStats::default();
    info!(worker = name, "consumer worker started");

    loop {
        let batch = tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            batch = source.next_batch() => batch,
        };

        let Some(batch) = batch else {
            break;
        };

        let report = consumer.consume_batch(batch).await;
        if !report.is_clean() {
            warn!(worker = name, failed = report.failures.len(), "batch had failures");
        }
        stats.record(&report);
    }

    info!(
        worker = name,
        batches = stats.batches,
        handled = stats.handled,
        failed = stats.failed,
        "consumer worker stopped"
    );
    stats
}
