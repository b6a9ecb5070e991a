use anyhow::Result;

use crate::db::{Database, LiveQuery, NotificationReminder};

/// Typed access to notification reminders.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Database,
}

impl NotificationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn reminders(&self) -> Result<LiveQuery<Vec<NotificationReminder>>> {
        self.db.watch_all_reminders().await
    }

    pub async fn insert(&self, reminder: &NotificationReminder) -> Result<i64> {
        self.db.insert_reminder(reminder).await
    }

    pub async fn update(&self, reminder: &NotificationReminder) -> Result<bool> {
        self.db.update_reminder(reminder).await
    }

    pub async fn delete(&self, reminder: &NotificationReminder) -> Result<bool> {
        self.db.delete_reminder(reminder).await
    }
}
