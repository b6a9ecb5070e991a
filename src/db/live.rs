//! Live queries: query results that re-publish after every write to the
//! table they read from.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};

use super::{Database, Table};
use crate::{log_debug, log_error};

const ENABLE_LOGS: bool = true;

/// Aborts the wrapped task when dropped.
pub(crate) struct TaskGuard(JoinHandle<()>);

impl TaskGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Latest result of a query, kept current by a background task.
///
/// Clones share the same refresh task; it stops once every clone is gone.
pub struct LiveQuery<T> {
    receiver: watch::Receiver<T>,
    _refresh: Arc<TaskGuard>,
}

impl<T> Clone for LiveQuery<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            _refresh: self._refresh.clone(),
        }
    }
}

impl<T> LiveQuery<T> {
    /// Wrap a receiver fed by the task behind `refresh`.
    pub(crate) fn from_parts(receiver: watch::Receiver<T>, refresh: TaskGuard) -> Self {
        Self {
            receiver,
            _refresh: Arc::new(refresh),
        }
    }
}

impl<T: Clone> LiveQuery<T> {
    /// Most recently published result.
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published result.
    pub async fn changed(&mut self) -> Result<T> {
        self.receiver
            .changed()
            .await
            .map_err(|_| anyhow!("live query closed"))?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Wait until a published result satisfies `predicate`, starting with the
    /// current one.
    pub async fn wait_for<P>(&mut self, mut predicate: P) -> Result<T>
    where
        P: FnMut(&T) -> bool,
    {
        loop {
            {
                let value = self.receiver.borrow_and_update();
                if predicate(&*value) {
                    return Ok(value.clone());
                }
            }
            self.changed().await?;
        }
    }
}

impl Database {
    /// Evaluate `query` now and again after every successful write to `table`.
    pub async fn live<T, F>(&self, table: Table, query: F) -> Result<LiveQuery<T>>
    where
        F: Fn(&mut Connection) -> Result<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let query = Arc::new(query);

        // Subscribe first so a write racing the initial read still triggers a refresh.
        let mut changes = self.subscribe_changes();

        let initial = {
            let query = query.clone();
            self.execute(move |conn| query(conn)).await?
        };
        let (publisher, receiver) = watch::channel(initial);

        let db = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(changed) if changed != table => continue,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        log_debug!("Live query on {table:?} lagged by {skipped} changes; refreshing");
                    }
                    Err(RecvError::Closed) => break,
                }

                let query = query.clone();
                match db.execute(move |conn| query(conn)).await {
                    Ok(value) => {
                        if publisher.send(value).is_err() {
                            break;
                        }
                    }
                    Err(err) => log_error!("Live query on {table:?} failed to refresh: {err:#}"),
                }
            }
        });

        Ok(LiveQuery::from_parts(receiver, TaskGuard::new(handle)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    async fn count_reminders(db: &Database) -> LiveQuery<i64> {
        db.live(Table::NotificationReminders, |conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM notification_reminders", [], |row| {
                row.get(0)
            })?)
        })
        .await
        .unwrap()
    }

    async fn add_reminder(db: &Database) {
        db.execute_write(Table::NotificationReminders, |conn| {
            conn.execute(
                "INSERT INTO notification_reminders (hour, minute, enabled) VALUES (8, 0, 1)",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn publishes_initial_result_immediately() {
        let db = Database::in_memory().unwrap();
        let live = count_reminders(&db).await;
        assert_eq!(live.current(), 0);
    }

    #[tokio::test]
    async fn refreshes_after_write_without_resubscribing() {
        let db = Database::in_memory().unwrap();
        let mut live = count_reminders(&db).await;

        add_reminder(&db).await;
        let value = timeout(Duration::from_secs(5), live.wait_for(|count| *count == 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn ignores_writes_to_other_tables() {
        let db = Database::in_memory().unwrap();
        let mut live = count_reminders(&db).await;

        db.execute_write(Table::CompletedTrainings, |_| Ok(()))
            .await
            .unwrap();
        let outcome = timeout(Duration::from_millis(200), live.changed()).await;
        assert!(outcome.is_err(), "unrelated write must not re-publish");
    }

    #[tokio::test]
    async fn clones_observe_the_same_stream() {
        let db = Database::in_memory().unwrap();
        let first = count_reminders(&db).await;
        let mut second = first.clone();
        drop(first);

        add_reminder(&db).await;
        let value = timeout(Duration::from_secs(5), second.wait_for(|count| *count == 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 1);
    }
}
