//! Database-backed tests for `daily_activity` operations.
//!
//! Each test runs against a fresh schema created from the workspace
//! migrations via `#[sqlx::test]`.

use chrono::NaiveDate;
use devpulse_db::{get_activity_by_date, list_activity_between, upsert_daily_activity};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_inserts_new_row_with_derived_total(pool: sqlx::PgPool) {
    let d = date(2024, 1, 1);
    let row = upsert_daily_activity(&pool, d, 3, 2)
        .await
        .expect("upsert should succeed");

    assert_eq!(row.activity_date, d);
    assert_eq!(row.github_count, 3);
    assert_eq!(row.leetcode_count, 2);
    assert_eq!(row.total_count, 5);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_overwrites_counts_and_recomputes_total(pool: sqlx::PgPool) {
    let d = date(2024, 1, 1);
    let first = upsert_daily_activity(&pool, d, 3, 2)
        .await
        .expect("first upsert");
    let second = upsert_daily_activity(&pool, d, 1, 0)
        .await
        .expect("second upsert");

    // Same row, not a new one; counts fully replaced, not added.
    assert_eq!(second.id, first.id);
    assert_eq!(second.github_count, 1);
    assert_eq!(second.leetcode_count, 0);
    assert_eq!(second.total_count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_is_idempotent_except_updated_at(pool: sqlx::PgPool) {
    let d = date(2024, 1, 1);
    let first = upsert_daily_activity(&pool, d, 4, 6)
        .await
        .expect("first upsert");
    let second = upsert_daily_activity(&pool, d, 4, 6)
        .await
        .expect("second upsert");

    assert_eq!(second.id, first.id);
    assert_eq!(second.github_count, first.github_count);
    assert_eq!(second.leetcode_count, first.leetcode_count);
    assert_eq!(second.total_count, first.total_count);
    // updated_at refreshes even on a no-op overwrite.
    assert!(second.updated_at >= first.updated_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn at_most_one_row_per_date(pool: sqlx::PgPool) {
    let d = date(2024, 1, 1);
    upsert_daily_activity(&pool, d, 1, 1).await.expect("first");
    upsert_daily_activity(&pool, d, 2, 2).await.expect("second");

    let rows = list_activity_between(&pool, d, d)
        .await
        .expect("list should succeed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_count, 4);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_between_is_inclusive_and_ascending(pool: sqlx::PgPool) {
    // Insert out of order across the boundary dates.
    upsert_daily_activity(&pool, date(2024, 1, 3), 1, 0)
        .await
        .expect("upsert");
    upsert_daily_activity(&pool, date(2024, 1, 1), 2, 0)
        .await
        .expect("upsert");
    upsert_daily_activity(&pool, date(2024, 1, 2), 3, 0)
        .await
        .expect("upsert");
    // Outside the queried window.
    upsert_daily_activity(&pool, date(2024, 1, 4), 9, 9)
        .await
        .expect("upsert");

    let rows = list_activity_between(&pool, date(2024, 1, 1), date(2024, 1, 3))
        .await
        .expect("list should succeed");

    let dates: Vec<_> = rows.iter().map(|r| r.activity_date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_by_date_returns_none_for_missing_row(pool: sqlx::PgPool) {
    let found = get_activity_by_date(&pool, date(2024, 1, 1))
        .await
        .expect("query should succeed");
    assert!(found.is_none());

    upsert_daily_activity(&pool, date(2024, 1, 1), 1, 2)
        .await
        .expect("upsert");

    let found = get_activity_by_date(&pool, date(2024, 1, 1))
        .await
        .expect("query should succeed")
        .expect("row should exist");
    assert_eq!(found.total_count, 3);
}
