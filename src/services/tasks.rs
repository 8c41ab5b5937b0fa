//! Background wrappers around the blocking operations.
//!
//! Every operation is a single sequential filesystem traversal. These helpers run it on
//! tokio's blocking pool and hand its events to the caller through an unbounded channel, so
//! an async front end can render progress without stalling the copy.
//!
//! Must be called from inside a tokio runtime.

use crate::models::{InstallProgress, ModPack};
use crate::services::InstallError;
use crate::services::backup::BackupOutcome;
use crate::services::install::InstallOrchestrator;
use crate::services::scanner::ModPackScanner;
use camino::Utf8PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events of a running operation plus its final result.
///
/// Drain events with [`next`](Self::next) until it returns `None`, then call
/// [`finish`](Self::finish). Dropping the stream does not stop the operation.
#[derive(Debug)]
pub struct ProgressStream<T, R> {
    events: mpsc::UnboundedReceiver<T>,
    handle: JoinHandle<Result<R, InstallError>>,
}

impl<T, R> ProgressStream<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Run `operation` on the blocking pool. It receives the sender for its events.
    pub fn spawn<F>(operation: F) -> Self
    where
        F: FnOnce(mpsc::UnboundedSender<T>) -> Result<R, InstallError> + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || operation(tx));
        Self { events, handle }
    }

    /// Next event, or `None` once the operation has finished and every event was read.
    pub async fn next(&mut self) -> Option<T> {
        self.events.recv().await
    }

    /// Wait for the operation and return its result.
    ///
    /// Events not yet read are discarded.
    pub async fn finish(self) -> Result<R, InstallError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Background operation did not complete: {}", e);
                Err(InstallError::Interrupted(e.to_string()))
            }
        }
    }
}

/// Install `pack`, streaming every progress snapshot.
pub fn spawn_install(
    orchestrator: InstallOrchestrator,
    pack: ModPack,
) -> ProgressStream<InstallProgress, InstallProgress> {
    ProgressStream::spawn(move |tx| {
        orchestrator.install_mod(&pack, |progress| {
            let _ = tx.send(progress.clone());
        })
    })
}

/// Create the backup snapshot, streaming status messages.
pub fn spawn_backup(orchestrator: InstallOrchestrator) -> ProgressStream<String, BackupOutcome> {
    ProgressStream::spawn(move |tx| {
        orchestrator.create_backup(|message| {
            let _ = tx.send(message.to_string());
        })
    })
}

/// Restore the backup snapshot, streaming status messages.
pub fn spawn_restore(orchestrator: InstallOrchestrator) -> ProgressStream<String, Vec<String>> {
    ProgressStream::spawn(move |tx| {
        orchestrator.restore_backup(|message| {
            let _ = tx.send(message.to_string());
        })
    })
}

/// Scan a folder off the async threads. Emits no events.
pub async fn scan_in_background(
    scanner: ModPackScanner,
    candidate: Utf8PathBuf,
) -> Result<ModPack, InstallError> {
    ProgressStream::<(), ModPack>::spawn(move |_| scanner.scan(&candidate))
        .finish()
        .await
}
