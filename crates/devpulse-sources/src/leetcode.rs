//! Client for the LeetCode GraphQL submission calendar.
//!
//! The calendar is double-encoded: the GraphQL envelope nests
//! `data.matchedUser.userCalendar.submissionCalendar`, whose value is itself
//! a JSON *string* encoding a map from epoch-second keys to submission
//! counts. Decoding runs in two explicit stages — envelope to inner string,
//! then inner string to dated counts — and each stage fails closed to an
//! empty result instead of propagating a decode error.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://leetcode.com/";

const CALENDAR_QUERY: &str = "\
query userProfileCalendar($username: String!) {
  matchedUser(username: $username) {
    userCalendar {
      submissionCalendar
    }
  }
}";

/// Client for the LeetCode GraphQL API.
///
/// Use [`LeetCodeClient::new`] for production or
/// [`LeetCodeClient::with_base_url`] to point at a mock server in tests.
pub struct LeetCodeClient {
    client: Client,
    username: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeData {
    #[serde(default)]
    matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    #[serde(default)]
    user_calendar: Option<UserCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserCalendar {
    #[serde(default)]
    submission_calendar: Option<String>,
}

impl LeetCodeClient {
    /// Creates a new client pointed at the production LeetCode API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(username: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_base_url(username, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        username: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("devpulse/0.1 (activity-aggregation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| SourceError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            username: username.to_owned(),
            base_url,
        })
    }

    /// Fetches the submission calendar for `[from, to]` inclusive.
    ///
    /// Returns a map from calendar date (epoch seconds interpreted in UTC)
    /// to submission count, containing only dates the API reported within
    /// the window. A response missing any envelope level, or carrying an
    /// inner calendar string that does not parse, yields an empty map.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or non-2xx HTTP status.
    /// - [`SourceError::Deserialize`] if the response body is not JSON.
    pub async fn submission_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i32>, SourceError> {
        let url = self
            .base_url
            .join("graphql")
            .map_err(|_| SourceError::InvalidBaseUrl(self.base_url.to_string()))?;

        let payload = json!({
            "query": CALENDAR_QUERY,
            "variables": { "username": self.username },
        });

        let body = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let envelope: GraphQlEnvelope =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: format!("submission_calendar(username={})", self.username),
                source: e,
            })?;

        let Some(calendar_json) = extract_calendar_string(envelope) else {
            tracing::debug!("submission calendar absent from envelope");
            return Ok(HashMap::new());
        };

        let calendar = parse_epoch_calendar(&calendar_json, from, to);
        tracing::debug!(days = calendar.len(), "fetched leetcode submission calendar");
        Ok(calendar)
    }
}

/// Decode stage one: walk the GraphQL envelope down to the string-encoded
/// calendar. Any missing level yields `None`.
fn extract_calendar_string(envelope: GraphQlEnvelope) -> Option<String> {
    envelope
        .data
        .and_then(|d| d.matched_user)
        .and_then(|u| u.user_calendar)
        .and_then(|c| c.submission_calendar)
}

/// Decode stage two: parse the inner `{"<epoch-seconds>": <count>, ...}`
/// string and convert keys to UTC calendar dates, keeping only `[from, to]`.
///
/// Fails closed: a string that is not a JSON object of numeric entries
/// yields an empty map, and individual entries with unparseable keys or
/// out-of-range timestamps are skipped.
///
/// Upstream keys are midnight-aligned, one per UTC day. Should several
/// distinct keys ever land on the same day, their counts are summed into
/// that day's entry.
fn parse_epoch_calendar(
    calendar_json: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> HashMap<NaiveDate, i32> {
    let Ok(epoch_map) = serde_json::from_str::<HashMap<String, i64>>(calendar_json) else {
        return HashMap::new();
    };

    let mut out = HashMap::new();
    for (key, count) in epoch_map {
        let Ok(epoch_seconds) = key.parse::<i64>() else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(epoch_seconds, 0) else {
            continue;
        };

        let date = timestamp.date_naive();
        if date >= from && date <= to {
            let count = i32::try_from(count.max(0)).unwrap_or(i32::MAX);
            *out.entry(date).or_insert(0) += count;
        }
    }

    out
}
