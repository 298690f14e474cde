//! Database operations for the `daily_activity` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `daily_activity` table.
///
/// `total_count` is derived: the upsert statement always writes
/// `github_count + leetcode_count`, so the column never diverges from its
/// components.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyActivityRow {
    pub id: i64,
    pub activity_date: NaiveDate,
    pub github_count: i32,
    pub leetcode_count: i32,
    pub total_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Upserts the activity counts for a single date.
///
/// Conflicts on `activity_date` overwrite `github_count` and
/// `leetcode_count` in place (full replace, not additive). `total_count` is
/// recomputed from the bound counts and `updated_at` is set to `NOW()` on
/// every write, including no-op overwrites. A single statement keyed on the
/// unique date column keeps concurrent refreshes of overlapping ranges free
/// of lost updates.
///
/// Returns the row as persisted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_daily_activity(
    pool: &PgPool,
    date: NaiveDate,
    github_count: i32,
    leetcode_count: i32,
) -> Result<DailyActivityRow, DbError> {
    let total_count = github_count + leetcode_count;

    let row = sqlx::query_as::<_, DailyActivityRow>(
        "INSERT INTO daily_activity \
             (activity_date, github_count, leetcode_count, total_count, updated_at) \
         VALUES ($1, $2, $3, $4, NOW()) \
         ON CONFLICT (activity_date) DO UPDATE SET \
             github_count   = EXCLUDED.github_count, \
             leetcode_count = EXCLUDED.leetcode_count, \
             total_count    = EXCLUDED.total_count, \
             updated_at     = NOW() \
         RETURNING id, activity_date, github_count, leetcode_count, total_count, updated_at",
    )
    .bind(date)
    .bind(github_count)
    .bind(leetcode_count)
    .bind(total_count)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Lists the activity rows with `activity_date` in `[start, end]` inclusive,
/// ordered ascending by date.
///
/// Dates in the range with no row are simply absent; gap-filling is the
/// caller's concern.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_activity_between(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyActivityRow>, DbError> {
    let rows = sqlx::query_as::<_, DailyActivityRow>(
        "SELECT id, activity_date, github_count, leetcode_count, total_count, updated_at \
         FROM daily_activity \
         WHERE activity_date >= $1 AND activity_date <= $2 \
         ORDER BY activity_date ASC",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches the activity row for a single date, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_activity_by_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<DailyActivityRow>, DbError> {
    let row = sqlx::query_as::<_, DailyActivityRow>(
        "SELECT id, activity_date, github_count, leetcode_count, total_count, updated_at \
         FROM daily_activity WHERE activity_date = $1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
