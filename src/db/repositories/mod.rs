//! SQL for each record collection, exposed as `impl Database` blocks.

pub mod reminders;
pub mod trainings;
