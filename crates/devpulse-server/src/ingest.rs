//! Ingestion pipeline: fetch both upstream calendars for a date window and
//! upsert the merged per-day counts.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use devpulse_db::DbError;
use devpulse_sources::{GithubClient, LeetCodeClient, SourceError};
use sqlx::PgPool;

/// Fetches both calendars for `[start, end]` and upserts one row per day.
///
/// The two fetches run concurrently and are independent; a failure of either
/// degrades that source to an empty calendar (logged, not fatal), so one
/// broken upstream never blocks ingestion of the other. Counts are a full
/// replace per run, not additive: a date absent from both calendars is still
/// written with zeros.
///
/// Returns the number of days upserted.
///
/// # Errors
///
/// Returns [`DbError`] if any upsert fails. The call is fail-fast: a storage
/// error aborts the remaining days and must be surfaced to the caller, since
/// a partially-refreshed range is indistinguishable from never-ingested data
/// on the read side.
pub async fn refresh_range(
    pool: &PgPool,
    github: &GithubClient,
    leetcode: &LeetCodeClient,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize, DbError> {
    let (github_result, leetcode_result) = tokio::join!(
        github.contribution_calendar(start, end),
        leetcode.submission_calendar(start, end),
    );

    let github_calendar = calendar_or_empty("github", github_result);
    let leetcode_calendar = calendar_or_empty("leetcode", leetcode_result);

    let mut days = 0_usize;
    let mut date = start;
    while date <= end {
        let github_count = github_calendar.get(&date).copied().unwrap_or(0);
        let leetcode_count = leetcode_calendar.get(&date).copied().unwrap_or(0);

        devpulse_db::upsert_daily_activity(pool, date, github_count, leetcode_count).await?;

        days += 1;
        date += Duration::days(1);
    }

    tracing::info!(%start, %end, days, "refreshed activity range");
    Ok(days)
}

/// Degrade an upstream fetch failure to an empty calendar with a warning.
fn calendar_or_empty(
    source: &str,
    result: Result<HashMap<NaiveDate, i32>, SourceError>,
) -> HashMap<NaiveDate, i32> {
    match result {
        Ok(calendar) => calendar,
        Err(e) => {
            tracing::warn!(source, error = %e, "calendar fetch failed; ingesting zeros");
            HashMap::new()
        }
    }
}
