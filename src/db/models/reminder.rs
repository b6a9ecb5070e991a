use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A user-configured time of day for a training reminder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReminder {
    pub id: i64,
    pub hour: u8,
    pub minute: u8,
    pub enabled: bool,
}

impl NotificationReminder {
    /// Unsaved, enabled reminder.
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            id: 0,
            hour,
            minute,
            enabled: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hour > 23 {
            bail!("reminder hour {} is out of range", self.hour);
        }
        if self.minute > 59 {
            bail!("reminder minute {} is out of range", self.minute);
        }
        Ok(())
    }
}
