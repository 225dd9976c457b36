use chrono::{DateTime, NaiveDateTime, Utc};
use december_types::models::{Confession, ConfessionId};
use serde::Deserialize;

use crate::StoreError;

/// Raw `messages` row as either backend hands it back. Timestamps stay
/// strings until [`parse_timestamp`] has had a go at them.
#[derive(Debug, Deserialize)]
pub struct ConfessionRow {
    pub id: ConfessionId,
    pub text: String,
    pub created_at: String,
    #[serde(default)]
    pub likes: Option<i64>,
}

impl TryFrom<ConfessionRow> for Confession {
    type Error = StoreError;

    fn try_from(row: ConfessionRow) -> Result<Self, Self::Error> {
        let created_at = parse_timestamp(&row.created_at).ok_or_else(|| {
            StoreError::Corrupt(format!("created_at '{}' on {}", row.created_at, row.id))
        })?;
        let raw_likes = row.likes.unwrap_or(0);
        let likes = u64::try_from(raw_likes)
            .map_err(|_| StoreError::Corrupt(format!("likes {} on {}", raw_likes, row.id)))?;

        Ok(Confession {
            id: row.id,
            text: row.text,
            created_at,
            likes,
        })
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD[ T]HH:MM:SS[.frac]` read as UTC
/// (SQLite's `datetime('now')`, Postgres `timestamp` without time zone).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres renders offsets as `+00`, which RFC 3339 rejects.
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ndt| ndt.and_utc())
}
