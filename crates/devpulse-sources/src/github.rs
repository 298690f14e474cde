//! Client for the GitHub GraphQL contribution calendar.
//!
//! The calendar arrives as `data.user.contributionsCollection
//! .contributionCalendar.weeks[].contributionDays[]`, each day carrying a
//! date string and a count. Every level of the envelope is optional on the
//! wire; a missing level yields an empty calendar rather than an error.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://api.github.com/";

const CONTRIBUTIONS_QUERY: &str = "\
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}";

/// Client for the GitHub GraphQL API.
///
/// Use [`GithubClient::new`] for production or
/// [`GithubClient::with_base_url`] to point at a mock server in tests.
pub struct GithubClient {
    client: Client,
    username: String,
    token: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    #[serde(default)]
    contributions_collection: Option<ContributionsCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    #[serde(default)]
    contribution_calendar: Option<ContributionCalendar>,
}

#[derive(Debug, Deserialize)]
struct ContributionCalendar {
    #[serde(default)]
    weeks: Vec<Week>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Week {
    #[serde(default)]
    contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionDay {
    date: String,
    #[serde(default)]
    contribution_count: i32,
}

impl GithubClient {
    /// Creates a new client pointed at the production GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(username: &str, token: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Self::with_base_url(username, token, timeout_secs, DEFAULT_BASE_URL)
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
        token: &str,
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
            token: token.to_owned(),
            base_url,
        })
    }

    /// Fetches the contribution calendar for `[from, to]` inclusive.
    ///
    /// Returns a map from calendar date to contribution count containing only
    /// the dates the API reported. A structurally valid response missing any
    /// envelope level yields an empty map.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or non-2xx HTTP status.
    /// - [`SourceError::Deserialize`] if the response body is not JSON.
    pub async fn contribution_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<NaiveDate, i32>, SourceError> {
        let url = self
            .base_url
            .join("graphql")
            .map_err(|_| SourceError::InvalidBaseUrl(self.base_url.to_string()))?;

        let payload = json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": {
                "login": self.username,
                "from": format!("{from}T00:00:00Z"),
                "to": format!("{to}T23:59:59Z"),
            },
        });

        let body = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let envelope: GraphQlEnvelope =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: format!("contribution_calendar(login={})", self.username),
                source: e,
            })?;

        let calendar = flatten_calendar(envelope, from, to);
        tracing::debug!(days = calendar.len(), "fetched github contribution calendar");
        Ok(calendar)
    }
}

/// Walk the envelope down to the day entries, dropping out to an empty map
/// whenever a level is missing and skipping days with unparseable dates.
fn flatten_calendar(
    envelope: GraphQlEnvelope,
    from: NaiveDate,
    to: NaiveDate,
) -> HashMap<NaiveDate, i32> {
    let mut out = HashMap::new();

    let Some(calendar) = envelope
        .data
        .and_then(|d| d.user)
        .and_then(|u| u.contributions_collection)
        .and_then(|c| c.contribution_calendar)
    else {
        return out;
    };

    for week in calendar.weeks {
        for day in week.contribution_days {
            let Ok(date) = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") else {
                continue;
            };
            if date >= from && date <= to {
                out.insert(date, day.contribution_count.max(0));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn envelope_from(value: serde_json::Value) -> GraphQlEnvelope {
        serde_json::from_value(value).expect("envelope should deserialize")
    }

    #[test]
    fn flatten_extracts_days_within_range() {
        let envelope = envelope_from(serde_json::json!({
            "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                "weeks": [
                    { "contributionDays": [
                        { "date": "2024-01-01", "contributionCount": 3 },
                        { "date": "2024-01-02", "contributionCount": 0 },
                    ]},
                    { "contributionDays": [
                        { "date": "2024-01-08", "contributionCount": 7 },
                    ]},
                ]
            }}}}
        }));

        let map = flatten_calendar(envelope, date(2024, 1, 1), date(2024, 1, 7));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&date(2024, 1, 1)), Some(&3));
        assert_eq!(map.get(&date(2024, 1, 2)), Some(&0));
        assert!(!map.contains_key(&date(2024, 1, 8)), "out-of-range date kept");
    }

    #[test]
    fn flatten_returns_empty_when_user_is_null() {
        let envelope = envelope_from(serde_json::json!({ "data": { "user": null } }));
        let map = flatten_calendar(envelope, date(2024, 1, 1), date(2024, 1, 31));
        assert!(map.is_empty());
    }

    #[test]
    fn flatten_returns_empty_when_data_is_missing() {
        let envelope = envelope_from(serde_json::json!({ "errors": [{ "message": "bad" }] }));
        let map = flatten_calendar(envelope, date(2024, 1, 1), date(2024, 1, 31));
        assert!(map.is_empty());
    }

    #[test]
    fn flatten_skips_malformed_dates() {
        let envelope = envelope_from(serde_json::json!({
            "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                "weeks": [
                    { "contributionDays": [
                        { "date": "not-a-date", "contributionCount": 3 },
                        { "date": "2024-01-02", "contributionCount": 1 },
                    ]},
                ]
            }}}}
        }));

        let map = flatten_calendar(envelope, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&date(2024, 1, 2)), Some(&1));
    }
}
