use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use crate::db::{
    helpers::{date_to_epoch_day, decode_ids, encode_ids, epoch_day_to_date, to_i64, to_u64},
    live::LiveQuery,
    models::CompletedTraining,
    Database, Table,
};

const TRAINING_COLUMNS: &str =
    "id, duration_ms, start_time_ms, end_time_ms, made_exercise_ids, all_exercise_ids, progress, date";

fn row_to_training(row: &Row) -> Result<CompletedTraining> {
    let duration_ms: i64 = row.get("duration_ms")?;
    let made: String = row.get("made_exercise_ids")?;
    let all: String = row.get("all_exercise_ids")?;
    let progress: f64 = row.get("progress")?;
    let date: i64 = row.get("date")?;

    Ok(CompletedTraining {
        id: row.get("id")?,
        duration_ms: to_u64(duration_ms, "duration_ms")?,
        start_time_ms: row.get("start_time_ms")?,
        end_time_ms: row.get("end_time_ms")?,
        made_exercise_ids: decode_ids(&made, "made_exercise_ids")?,
        all_exercise_ids: decode_ids(&all, "all_exercise_ids")?,
        progress: progress as f32,
        date: epoch_day_to_date(date, "date")?,
    })
}

fn query_trainings<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<CompletedTraining>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut trainings = Vec::new();
    while let Some(row) = rows.next()? {
        trainings.push(row_to_training(row)?);
    }
    Ok(trainings)
}

fn select_by_date(conn: &Connection, date: NaiveDate) -> Result<Vec<CompletedTraining>> {
    query_trainings(
        conn,
        &format!(
            "SELECT {TRAINING_COLUMNS} FROM completed_trainings
             WHERE date = ?1"
        ),
        params![date_to_epoch_day(date)],
    )
}

fn select_all(conn: &Connection) -> Result<Vec<CompletedTraining>> {
    query_trainings(
        conn,
        &format!(
            "SELECT {TRAINING_COLUMNS} FROM completed_trainings
             ORDER BY date DESC, id DESC"
        ),
        [],
    )
}

fn select_by_id(conn: &Connection, training_id: i64) -> Result<Option<CompletedTraining>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRAINING_COLUMNS} FROM completed_trainings
         WHERE id = ?1"
    ))?;
    let training = stmt
        .query_row(params![training_id], |row| Ok(row_to_training(row)))
        .optional()?
        .transpose()?;
    Ok(training)
}

impl Database {
    /// Insert a completed training and return its id.
    ///
    /// A record carrying an existing non-zero id replaces that row.
    pub async fn insert_training(&self, training: &CompletedTraining) -> Result<i64> {
        training.validate()?;
        let record = training.clone();
        self.execute_write(Table::CompletedTrainings, move |conn| {
            let id = (record.id != 0).then_some(record.id);
            conn.execute(
                "INSERT OR REPLACE INTO completed_trainings
                    (id, duration_ms, start_time_ms, end_time_ms, made_exercise_ids, all_exercise_ids, progress, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    to_i64(record.duration_ms)?,
                    record.start_time_ms,
                    record.end_time_ms,
                    encode_ids(&record.made_exercise_ids)?,
                    encode_ids(&record.all_exercise_ids)?,
                    f64::from(record.progress),
                    date_to_epoch_day(record.date),
                ],
            )
            .with_context(|| "failed to insert completed training")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Overwrite the row matching `training.id`. Returns `false` when none matched.
    pub async fn update_training(&self, training: &CompletedTraining) -> Result<bool> {
        training.validate()?;
        let record = training.clone();
        self.execute_write(Table::CompletedTrainings, move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE completed_trainings
                     SET duration_ms = ?1,
                         start_time_ms = ?2,
                         end_time_ms = ?3,
                         made_exercise_ids = ?4,
                         all_exercise_ids = ?5,
                         progress = ?6,
                         date = ?7
                     WHERE id = ?8",
                    params![
                        to_i64(record.duration_ms)?,
                        record.start_time_ms,
                        record.end_time_ms,
                        encode_ids(&record.made_exercise_ids)?,
                        encode_ids(&record.all_exercise_ids)?,
                        f64::from(record.progress),
                        date_to_epoch_day(record.date),
                        record.id,
                    ],
                )
                .with_context(|| "failed to update completed training")?;
            Ok(rows_affected > 0)
        })
        .await
    }

    /// Remove the row matching `training.id`. Returns `false` when none matched.
    pub async fn delete_training(&self, training: &CompletedTraining) -> Result<bool> {
        let training_id = training.id;
        self.execute_write(Table::CompletedTrainings, move |conn| {
            let rows_affected = conn
                .execute(
                    "DELETE FROM completed_trainings WHERE id = ?1",
                    params![training_id],
                )
                .with_context(|| "failed to delete completed training")?;
            Ok(rows_affected > 0)
        })
        .await
    }

    pub async fn get_trainings_by_date(&self, date: NaiveDate) -> Result<Vec<CompletedTraining>> {
        self.execute(move |conn| select_by_date(conn, date)).await
    }

    /// All trainings, newest date first.
    pub async fn get_all_trainings(&self) -> Result<Vec<CompletedTraining>> {
        self.execute(|conn| select_all(conn)).await
    }

    pub async fn get_training(&self, training_id: i64) -> Result<Option<CompletedTraining>> {
        self.execute(move |conn| select_by_id(conn, training_id))
            .await
    }

    pub async fn watch_trainings_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<LiveQuery<Vec<CompletedTraining>>> {
        self.live(Table::CompletedTrainings, move |conn| {
            select_by_date(conn, date)
        })
        .await
    }

    pub async fn watch_all_trainings(&self) -> Result<LiveQuery<Vec<CompletedTraining>>> {
        self.live(Table::CompletedTrainings, |conn| select_all(conn))
            .await
    }

    pub async fn watch_training(
        &self,
        training_id: i64,
    ) -> Result<LiveQuery<Option<CompletedTraining>>> {
        self.live(Table::CompletedTrainings, move |conn| {
            select_by_id(conn, training_id)
        })
        .await
    }
}
