use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::ChatState;
use super::Snapshots;
use crate::domain::models::Event;

/// Where a session reports what happened to it. Both outlets are optional.
#[derive(Default)]
pub struct Publisher {
    events: Option<mpsc::UnboundedSender<Event>>,
    snapshots: Option<Snapshots>,
    write_lock: tokio::sync::Mutex<()>,
}

impl Publisher {
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Publisher {
        self.events = Some(tx);
        return self;
    }

    pub fn with_snapshots(mut self, snapshots: Snapshots) -> Publisher {
        self.snapshots = Some(snapshots);
        return self;
    }

    pub fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("Event receiver is gone, dropping event");
            }
        }
    }

    /// Writes the current persisted fields. Writes are serialized and each one
    /// reads the state only once it holds the write lock, so the file always
    /// ends up with the latest state.
    pub async fn persist(&self, state: &Mutex<ChatState>) {
        let snapshots = match &self.snapshots {
            Some(snapshots) => snapshots,
            None => return,
        };

        let _guard = self.write_lock.lock().await;
        let snapshot = state.lock().snapshot();
        if let Err(err) = snapshots.save(&snapshot).await {
            tracing::warn!(
                error = ?err,
                path = ?snapshots.path(),
                "Failed to save assistant state"
            );
        }
    }
}
