use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn to_u8(value: i64, field: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| anyhow!("{field} value {value} out of range"))
}

pub fn date_to_epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn epoch_day_to_date(epoch_day: i64, field: &str) -> Result<NaiveDate> {
    i32::try_from(epoch_day + UNIX_EPOCH_DAYS_FROM_CE)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| anyhow!("{field} contains invalid epoch day {epoch_day}"))
}

pub fn encode_ids(ids: &[i64]) -> Result<String> {
    serde_json::to_string(ids).context("failed to encode exercise ids")
}

pub fn decode_ids(raw: &str, field: &str) -> Result<Vec<i64>> {
    serde_json::from_str(raw).with_context(|| format!("failed to parse {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_matches_known_dates() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_epoch_day(epoch), 0);

        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(date_to_epoch_day(date), 19_797);
        assert_eq!(epoch_day_to_date(19_797, "date").unwrap(), date);

        let before = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(date_to_epoch_day(before), -1);
    }

    #[test]
    fn decode_ids_rejects_garbage() {
        assert_eq!(decode_ids("[3,1,2]", "ids").unwrap(), vec![3, 1, 2]);
        assert!(decode_ids("not json", "ids").is_err());
    }

    #[test]
    fn narrowing_conversions_fail_loudly() {
        assert!(to_u64(-1, "duration_ms").is_err());
        assert!(to_u8(300, "hour").is_err());
        assert_eq!(to_i64(42).unwrap(), 42);
    }
}
