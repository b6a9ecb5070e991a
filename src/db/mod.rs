use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::{broadcast, oneshot};

pub mod helpers;
pub mod live;
mod migrations;
pub mod models;
pub mod repositories;

use migrations::run_migrations;

pub use live::LiveQuery;
pub use models::{CompletedTraining, NotificationReminder, TrainingInfo};

const IN_MEMORY_PATH: &str = ":memory:";
const CHANGE_CHANNEL_CAPACITY: usize = 64;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

/// Worker body: migrate, report readiness, then serve commands until told to stop.
fn run_worker(
    mut conn: Connection,
    commands: mpsc::Receiver<DbCommand>,
    ready: mpsc::Sender<Result<()>>,
) {
    let migrated = run_migrations(&mut conn).context("failed to run database migrations");
    let migrated_ok = migrated.is_ok();
    if ready.send(migrated).is_err() || !migrated_ok {
        return;
    }

    for command in commands.iter() {
        let DbCommand::Execute(task) = command else {
            break;
        };
        task(&mut conn);
    }

    info!("Database worker stopped");
}

/// Record collections that live queries can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    CompletedTrainings,
    NotificationReminders,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
    changes: broadcast::Sender<Table>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(handle) = handle else {
            return;
        };

        // A send error means the worker already exited; joining still reaps it.
        let _ = self.sender.send(DbCommand::Shutdown);
        if handle.join().is_err() {
            error!("Database worker panicked");
        }
    }
}

/// Handle to the SQLite worker thread. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let path_for_thread = db_path.clone();
        Self::spawn(db_path, move || {
            let conn = Connection::open(&path_for_thread)?;
            if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                error!("Failed to enable WAL mode: {err}");
            }
            Ok(conn)
        })
    }

    /// Private database that disappears with the last handle.
    pub fn in_memory() -> Result<Self> {
        Self::spawn(PathBuf::from(IN_MEMORY_PATH), Connection::open_in_memory)
    }

    fn spawn<F>(db_path: PathBuf, open: F) -> Result<Self>
    where
        F: FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let worker = thread::Builder::new()
            .name("soundr-db".into())
            .spawn(move || match open() {
                Ok(conn) => run_worker(conn, command_rx, ready_tx),
                Err(err) => {
                    let failed = Err::<(), _>(err).context("failed to open SQLite database");
                    let _ = ready_tx.send(failed);
                }
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before reporting readiness")??;

        info!("Database ready at {}", db_path.display());

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
                changes,
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Run `task` on the worker connection and await its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: DbTask = Box::new(move |conn| {
            // The caller may have been cancelled; the result is simply discarded.
            let _ = reply_tx.send(task(conn));
        });

        self.inner
            .sender
            .send(DbCommand::Execute(job))
            .map_err(|_| anyhow!("database worker is no longer running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker dropped the request"))?
    }

    /// Like [`Database::execute`], but tells live queries on `table` to refresh
    /// once the write has succeeded.
    ///
    /// The notification is sent by the worker right after the write, so it
    /// goes out even when the caller stops waiting for the result.
    pub async fn execute_write<F, T>(&self, table: Table, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let changes = self.inner.changes.clone();
        self.execute(move |conn| {
            let result = task(conn)?;
            // No receivers simply means no live query is open.
            let _ = changes.send(table);
            Ok(result)
        })
        .await
    }

    /// Stream of tables touched by successful writes.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<Table> {
        self.inner.changes.subscribe()
    }
}
