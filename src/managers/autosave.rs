//! Debounced background persistence.
//!
//! Snapshots handed to [`Autosaver::schedule`] are coalesced: each one
//! restarts the delay, and only the newest is written once the delay passes
//! without further changes. A failed write is logged and reflected in
//! [`SaveStatus`]; in-memory state is never rolled back.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::managers::forest_store::ForestStore;
use crate::types::errors::StoreError;
use crate::types::node::Forest;

/// Outcome of the most recent autosave activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    /// A snapshot is waiting for the debounce delay.
    Pending,
    Saved,
    Failed(String),
}

enum Command {
    Snapshot(Forest),
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

/// Handle to the autosave task.
pub struct Autosaver {
    tx: mpsc::UnboundedSender<Command>,
    status: Arc<Mutex<SaveStatus>>,
    task: JoinHandle<()>,
}

impl Autosaver {
    /// Spawns the autosave task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn ForestStore>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(SaveStatus::Idle));
        let task = tokio::spawn(run(store, delay, rx, Arc::clone(&status)));
        Self { tx, status, task }
    }

    /// Queues a snapshot; supersedes any snapshot not yet written.
    pub fn schedule(&self, forest: Forest) {
        if self.tx.send(Command::Snapshot(forest)).is_err() {
            warn!("autosave task has stopped; snapshot dropped");
        }
    }

    pub fn status(&self) -> SaveStatus {
        match self.status.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Writes the pending snapshot now, if there is one.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| StoreError::DatabaseError("autosave task has stopped".to_string()))?;
        response
            .await
            .map_err(|_| StoreError::DatabaseError("autosave task has stopped".to_string()))?
    }

    /// Flushes and stops the task.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        let result = self.flush().await;
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "autosave task ended abnormally");
        }
        result
    }
}

fn set_status(status: &Mutex<SaveStatus>, value: SaveStatus) {
    match status.lock() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

async fn write(
    store: &Arc<dyn ForestStore>,
    forest: Forest,
    status: &Mutex<SaveStatus>,
) -> Result<(), StoreError> {
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || store.save(&forest))
        .await
        .unwrap_or_else(|e| Err(StoreError::DatabaseError(e.to_string())));

    match &result {
        Ok(()) => {
            debug!("autosave complete");
            set_status(status, SaveStatus::Saved);
        }
        Err(e) => {
            error!(error = %e, "autosave failed; in-memory bookmarks are unsaved");
            set_status(status, SaveStatus::Failed(e.to_string()));
        }
    }
    result
}

async fn run(
    store: Arc<dyn ForestStore>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
    status: Arc<Mutex<SaveStatus>>,
) {
    let mut pending: Option<Forest> = None;

    loop {
        let command = if pending.is_some() {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    if let Some(forest) = pending.take() {
                        let _ = write(&store, forest, &status).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Snapshot(forest)) => {
                pending = Some(forest);
                set_status(&status, SaveStatus::Pending);
            }
            Some(Command::Flush(reply)) => {
                let result = match pending.take() {
                    Some(forest) => write(&store, forest, &status).await,
                    None => Ok(()),
                };
                let _ = reply.send(result);
            }
            None => {
                if let Some(forest) = pending.take() {
                    let _ = write(&store, forest, &status).await;
                }
                break;
            }
        }
    }
}
