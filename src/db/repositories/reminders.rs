use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::to_u8, live::LiveQuery, models::NotificationReminder, Database, Table,
};

fn row_to_reminder(row: &Row) -> Result<NotificationReminder> {
    let hour: i64 = row.get("hour")?;
    let minute: i64 = row.get("minute")?;

    Ok(NotificationReminder {
        id: row.get("id")?,
        hour: to_u8(hour, "hour")?,
        minute: to_u8(minute, "minute")?,
        enabled: row.get("enabled")?,
    })
}

fn select_all(conn: &Connection) -> Result<Vec<NotificationReminder>> {
    let mut stmt = conn.prepare(
        "SELECT id, hour, minute, enabled
         FROM notification_reminders",
    )?;

    let mut rows = stmt.query([])?;
    let mut reminders = Vec::new();
    while let Some(row) = rows.next()? {
        reminders.push(row_to_reminder(row)?);
    }
    Ok(reminders)
}

impl Database {
    /// Insert a reminder, replacing any row with the same non-zero id.
    pub async fn insert_reminder(&self, reminder: &NotificationReminder) -> Result<i64> {
        reminder.validate()?;
        let record = reminder.clone();
        self.execute_write(Table::NotificationReminders, move |conn| {
            let id = (record.id != 0).then_some(record.id);
            conn.execute(
                "INSERT OR REPLACE INTO notification_reminders (id, hour, minute, enabled)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, record.hour, record.minute, record.enabled],
            )
            .with_context(|| "failed to insert reminder")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn update_reminder(&self, reminder: &NotificationReminder) -> Result<bool> {
        reminder.validate()?;
        let record = reminder.clone();
        self.execute_write(Table::NotificationReminders, move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE notification_reminders
                     SET hour = ?1,
                         minute = ?2,
                         enabled = ?3
                     WHERE id = ?4",
                    params![record.hour, record.minute, record.enabled, record.id],
                )
                .with_context(|| "failed to update reminder")?;
            Ok(rows_affected > 0)
        })
        .await
    }

    pub async fn delete_reminder(&self, reminder: &NotificationReminder) -> Result<bool> {
        let reminder_id = reminder.id;
        self.execute_write(Table::NotificationReminders, move |conn| {
            let rows_affected = conn
                .execute(
                    "DELETE FROM notification_reminders WHERE id = ?1",
                    params![reminder_id],
                )
                .with_context(|| "failed to delete reminder")?;
            Ok(rows_affected > 0)
        })
        .await
    }

    pub async fn get_all_reminders(&self) -> Result<Vec<NotificationReminder>> {
        self.execute(|conn| select_all(conn)).await
    }

    pub async fn watch_all_reminders(&self) -> Result<LiveQuery<Vec<NotificationReminder>>> {
        self.live(Table::NotificationReminders, |conn| select_all(conn))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reminder_crud() {
        let db = Database::in_memory().unwrap();
        let id = db
            .insert_reminder(&NotificationReminder::new(7, 45))
            .await
            .unwrap();

        let mut stored = db.get_all_reminders().await.unwrap();
        assert_eq!(
            stored,
            vec![NotificationReminder {
                id,
                hour: 7,
                minute: 45,
                enabled: true,
            }]
        );

        let mut reminder = stored.remove(0);
        reminder.enabled = false;
        assert!(db.update_reminder(&reminder).await.unwrap());
        assert!(!db.get_all_reminders().await.unwrap()[0].enabled);

        assert!(db.delete_reminder(&reminder).await.unwrap());
        assert!(db.get_all_reminders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_out_of_range_times() {
        let db = Database::in_memory().unwrap();
        assert!(db.insert_reminder(&NotificationReminder::new(24, 0)).await.is_err());
        assert!(db.insert_reminder(&NotificationReminder::new(9, 60)).await.is_err());
        assert!(db.get_all_reminders().await.unwrap().is_empty());
    }
}
