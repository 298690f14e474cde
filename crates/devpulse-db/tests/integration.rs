//! Offline unit tests for devpulse-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, Utc};
use devpulse_core::{AppConfig, Environment};
use devpulse_db::{DailyActivityRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        github_username: "octocat".to_string(),
        github_token: "token".to_string(),
        leetcode_username: "octocat".to_string(),
        source_timeout_secs: 30,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`DailyActivityRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn daily_activity_row_has_expected_fields() {
    let row = DailyActivityRow {
        id: 1_i64,
        activity_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        github_count: 3_i32,
        leetcode_count: 2_i32,
        total_count: 5_i32,
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.github_count, 3);
    assert_eq!(row.leetcode_count, 2);
    assert_eq!(row.total_count, row.github_count + row.leetcode_count);
}
