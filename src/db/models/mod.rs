pub mod reminder;
pub mod training;

pub use reminder::NotificationReminder;
pub use training::{CompletedTraining, TrainingInfo};
