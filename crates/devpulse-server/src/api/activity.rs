//! Activity timeline read and refresh endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, NaiveDate, Utc};
use devpulse_core::resolve_range;
use devpulse_db::DailyActivityRow;
use serde::{Deserialize, Serialize};

use crate::ingest;
use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// One calendar day of the response timeline. `total` always equals
/// `github + leetcode`; days without a persisted row come back all-zero.
#[derive(Debug, Serialize)]
pub(super) struct ActivityDay {
    pub date: String,
    pub total: i32,
    pub github: i32,
    pub leetcode: i32,
}

#[derive(Debug, Serialize)]
pub(super) struct ActivityData {
    pub range: String,
    pub days: Vec<ActivityDay>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshData {
    pub range: String,
    pub days_refreshed: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    fn token(&self) -> &str {
        self.range.as_deref().unwrap_or("1y")
    }
}

/// `GET /api/v1/activity?range=` — the gap-free daily timeline.
///
/// Never fails on missing data: dates without a row are zero-filled, so the
/// response always carries exactly one entry per calendar day in range.
pub(super) async fn get_activity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<ActivityData>>, ApiError> {
    let token = query.token();
    let range = resolve_range(token, Utc::now().date_naive());

    let rows = devpulse_db::list_activity_between(&state.pool, range.start, range.end)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ActivityData {
            range: token.to_string(),
            days: assemble_days(range.start, range.end, rows),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/activity/refresh?range=` — synchronous re-ingestion.
///
/// Runs the full pipeline for the resolved window and reports how many days
/// were upserted. Storage failures surface as a structured error response
/// rather than a partial-success acknowledgement.
pub(super) async fn refresh_activity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<RefreshData>>, ApiError> {
    let token = query.token();
    let range = resolve_range(token, Utc::now().date_naive());

    let days_refreshed = ingest::refresh_range(
        &state.pool,
        &state.github,
        &state.leetcode,
        range.start,
        range.end,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RefreshData {
            range: token.to_string(),
            days_refreshed,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Expand persisted rows into a continuous per-day sequence over
/// `[start, end]` inclusive.
///
/// The result always has exactly `end - start + 1` entries in strictly
/// ascending date order; dates without a row yield all-zero entries. The
/// calendar heatmap on the frontend assumes this density.
fn assemble_days(start: NaiveDate, end: NaiveDate, rows: Vec<DailyActivityRow>) -> Vec<ActivityDay> {
    let by_date: HashMap<NaiveDate, DailyActivityRow> = rows
        .into_iter()
        .map(|row| (row.activity_date, row))
        .collect();

    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        let day = match by_date.get(&date) {
            Some(row) => ActivityDay {
                date: date.to_string(),
                total: row.total_count,
                github: row.github_count,
                leetcode: row.leetcode_count,
            },
            None => ActivityDay {
                date: date.to_string(),
                total: 0,
                github: 0,
                leetcode: 0,
            },
        };
        days.push(day);
        date += Duration::days(1);
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn row(activity_date: NaiveDate, github: i32, leetcode: i32) -> DailyActivityRow {
        DailyActivityRow {
            id: 0,
            activity_date,
            github_count: github,
            leetcode_count: leetcode,
            total_count: github + leetcode,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn empty_rows_yield_all_zero_days_covering_the_range() {
        let days = assemble_days(date(2024, 1, 1), date(2024, 1, 5), vec![]);

        assert_eq!(days.len(), 5);
        assert!(days.iter().all(|d| d.total == 0 && d.github == 0 && d.leetcode == 0));
        assert_eq!(days[0].date, "2024-01-01");
        assert_eq!(days[4].date, "2024-01-05");
    }

    #[test]
    fn single_day_range_yields_one_entry() {
        let days = assemble_days(date(2024, 1, 1), date(2024, 1, 1), vec![]);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "2024-01-01");
    }

    #[test]
    fn gaps_between_rows_are_zero_filled() {
        let rows = vec![row(date(2024, 1, 1), 3, 2), row(date(2024, 1, 3), 0, 7)];
        let days = assemble_days(date(2024, 1, 1), date(2024, 1, 3), rows);

        assert_eq!(days.len(), 3);
        assert_eq!((days[0].total, days[0].github, days[0].leetcode), (5, 3, 2));
        assert_eq!((days[1].total, days[1].github, days[1].leetcode), (0, 0, 0));
        assert_eq!((days[2].total, days[2].github, days[2].leetcode), (7, 0, 7));
    }

    #[test]
    fn dates_are_strictly_ascending_with_no_repeats() {
        let days = assemble_days(date(2023, 12, 28), date(2024, 1, 3), vec![]);

        assert_eq!(days.len(), 7, "range crossing a year boundary stays dense");
        for pair in days.windows(2) {
            assert!(pair[0].date < pair[1].date, "dates must strictly increase");
        }
    }

    #[test]
    fn total_always_equals_component_sum() {
        let rows = vec![row(date(2024, 1, 1), 4, 9), row(date(2024, 1, 2), 0, 0)];
        let days = assemble_days(date(2024, 1, 1), date(2024, 1, 2), rows);

        for day in &days {
            assert_eq!(day.total, day.github + day.leetcode);
        }
    }

    #[test]
    fn range_query_defaults_to_one_year_token() {
        let query = RangeQuery { range: None };
        assert_eq!(query.token(), "1y");

        let query = RangeQuery {
            range: Some("90d".to_string()),
        };
        assert_eq!(query.token(), "90d");
    }
}
