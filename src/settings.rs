use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::log_warn;

const ENABLE_LOGS: bool = true;

/// Time of the single reminder used before reminders moved into the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationTime {
    pub hour: u8,
    pub minute: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserSettings {
    /// Welcome flow has been seen.
    pub viewed: bool,
    pub show_notifications: bool,
    pub show_trainings: bool,
    pub notification_time: Option<NotificationTime>,
    pub user_name: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            viewed: false,
            show_notifications: true,
            show_trainings: true,
            notification_time: None,
            user_name: "User".into(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = read_settings(&path)?;
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Result<UserSettings> {
        Ok(self.read()?.clone())
    }

    pub fn is_first_run(&self) -> Result<bool> {
        Ok(!self.read()?.viewed)
    }

    pub fn mark_viewed(&self) -> Result<()> {
        self.update(|settings| settings.viewed = true)
    }

    pub fn set_show_notifications(&self, show: bool) -> Result<()> {
        self.update(|settings| settings.show_notifications = show)
    }

    pub fn set_show_trainings(&self, show: bool) -> Result<()> {
        self.update(|settings| settings.show_trainings = show)
    }

    /// Flip both home-screen sections at once.
    pub fn toggle_sections(&self) -> Result<()> {
        self.update(|settings| {
            settings.show_notifications = !settings.show_notifications;
            settings.show_trainings = !settings.show_trainings;
        })
    }

    pub fn set_notification_time(&self, time: Option<NotificationTime>) -> Result<()> {
        if let Some(NotificationTime { hour, minute }) = time {
            if hour > 23 || minute > 59 {
                return Err(anyhow!("invalid notification time {hour:02}:{minute:02}"));
            }
        }
        self.update(|settings| settings.notification_time = time)
    }

    /// Blank names are ignored.
    pub fn set_user_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let name = name.to_string();
        self.update(move |settings| settings.user_name = name)
    }

    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut UserSettings),
    {
        let mut guard = self.write()?;
        change(&mut *guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UserSettings>> {
        self.data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UserSettings>> {
        self.data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }
}

impl SettingsStore {
    /// Re-read the file, with the same fallbacks as [`SettingsStore::new`].
    pub fn reload(&self) -> Result<()> {
        let data = read_settings(&self.path)?;
        *self.write()? = data;
        Ok(())
    }
}

/// Missing file gives defaults; an undecodable one is logged and gives defaults.
fn read_settings(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
        log_warn!("Ignoring unreadable settings in {}: {err}", path.display());
        UserSettings::default()
    }))
}
