//! Google OAuth and Calendar API adapters, built on reqwest.
//!
//! The token endpoint is called directly rather than through a client
//! library so that `invalid_grant` responses surface as a typed error: that
//! distinction drives the "reconnect required" flag upstream.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use gigsync_core::error::{ApiError, RefreshError};
use gigsync_core::token::{RefreshedToken, TokenRefresher};
use gigsync_core::CalendarEventRef;
use serde::Deserialize;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Talks to Google's OAuth token endpoint for one configured client.
pub struct GoogleTokenClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

fn to_refreshed(tokens: TokenResponse) -> RefreshedToken {
    RefreshedToken {
        access_token: tokens.access_token,
        expires_at: tokens
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
        refresh_token: tokens.refresh_token,
    }
}

/// Google reports a revoked or invalid grant as HTTP 400 with
/// `"error": "invalid_grant"` in the body.
fn classify_refresh_failure(status: u16, body: &str) -> RefreshError {
    let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap_or_default();

    if parsed.error == "invalid_grant" {
        let reason = if parsed.error_description.is_empty() {
            parsed.error
        } else {
            parsed.error_description
        };
        RefreshError::InvalidGrant(reason)
    } else {
        RefreshError::Transient(format!("Token endpoint returned {}: {}", status, body))
    }
}

impl GoogleTokenClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        GoogleTokenClient {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
        }
    }

    /// Exchange an authorization code for the initial token set.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<RefreshedToken> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .context("Failed to send token request to Google")?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to exchange authorization code: {}", body);
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        Ok(to_refreshed(tokens))
    }
}

impl TokenRefresher for GoogleTokenClient {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, RefreshError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| RefreshError::Transient(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_refresh_failure(status.as_u16(), &body));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::Transient(format!("Failed to parse token response: {}", e)))?;

        Ok(to_refreshed(tokens))
    }
}

/// The consent URL the user opens to authorize gigsync.
pub fn consent_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<String> {
    let url = url::Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )?;
    Ok(url.to_string())
}

/// One event row from the Calendar API, trimmed to what the sync needs.
#[derive(Debug, Clone)]
pub struct FetchedEvent {
    pub id: String,
    pub title: String,
    pub calendar_id: String,
    pub start: Option<DateTime<Utc>>,
}

impl FetchedEvent {
    pub fn to_ref(&self) -> CalendarEventRef {
        CalendarEventRef {
            id: self.id.clone(),
            title: self.title.clone(),
            calendar_source_id: self.calendar_id.clone(),
        }
    }
}

#[derive(Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct GoogleEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    start: Option<GoogleEventTime>,
}

#[derive(Deserialize)]
struct GoogleEventTime {
    #[serde(default, rename = "dateTime")]
    date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

impl GoogleEventTime {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_time.or_else(|| {
            self.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
    }
}

fn to_fetched(items: Vec<GoogleEvent>, calendar_id: &str) -> Vec<FetchedEvent> {
    items
        .into_iter()
        .filter(|event| event.status != "cancelled" && !event.id.is_empty())
        .map(|event| FetchedEvent {
            id: event.id,
            title: if event.summary.is_empty() {
                "(No title)".to_string()
            } else {
                event.summary
            },
            calendar_id: calendar_id.to_string(),
            start: event.start.as_ref().and_then(|s| s.to_utc()),
        })
        .collect()
}

fn classify_api_failure(status: u16, message: String) -> ApiError {
    match status {
        401 | 403 => ApiError::Unauthorized { status, message },
        429 => ApiError::RateLimited,
        _ => ApiError::Provider { status, message },
    }
}

/// Fetch events from a calendar within `window_days` of today, in both
/// directions. 401/403 map to `ApiError::Unauthorized` so the token layer
/// can recover once.
pub async fn fetch_events(
    http: &reqwest::Client,
    access_token: &str,
    calendar_id: &str,
    window_days: i64,
) -> Result<Vec<FetchedEvent>, ApiError> {
    let now = Utc::now();
    let time_min = (now - Duration::days(window_days)).to_rfc3339();
    let time_max = (now + Duration::days(window_days)).to_rfc3339();

    let url = format!("{}/calendars/{}/events", CALENDAR_API_BASE, calendar_id);

    let mut events = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut request = http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("maxResults", "250"),
            ]);

        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(classify_api_failure(status.as_u16(), message));
        }

        let page: EventsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        events.extend(to_fetched(page.items, calendar_id));

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(events)
}

#[derive(Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Deserialize)]
struct CalendarListEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    primary: bool,
}

/// Discover the account identifier: the id of the primary calendar, which is
/// the user's email address.
pub async fn primary_calendar_id(
    http: &reqwest::Client,
    access_token: &str,
) -> Result<String, ApiError> {
    let url = format!("{}/users/me/calendarList", CALENDAR_API_BASE);

    let response = http
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(classify_api_failure(status.as_u16(), message));
    }

    let list: CalendarListResponse = response
        .json()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(list
        .items
        .into_iter()
        .find(|entry| entry.primary)
        .map(|entry| entry.id)
        .unwrap_or_else(|| "primary".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_grant_body_requires_reconnect() {
        let body = r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#;
        let error = classify_refresh_failure(400, body);
        assert!(matches!(error, RefreshError::InvalidGrant(_)));
    }

    #[test]
    fn test_other_token_failures_are_transient() {
        let error = classify_refresh_failure(503, "Service Unavailable");
        assert!(matches!(error, RefreshError::Transient(_)));

        let body = r#"{"error": "internal_failure"}"#;
        let error = classify_refresh_failure(500, body);
        assert!(matches!(error, RefreshError::Transient(_)));
    }

    #[test]
    fn test_api_status_classification() {
        assert!(matches!(
            classify_api_failure(401, String::new()),
            ApiError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            classify_api_failure(403, String::new()),
            ApiError::Unauthorized { status: 403, .. }
        ));
        assert!(matches!(
            classify_api_failure(429, String::new()),
            ApiError::RateLimited
        ));
        assert!(matches!(
            classify_api_failure(500, String::new()),
            ApiError::Provider { status: 500, .. }
        ));
    }

    #[test]
    fn test_cancelled_and_idless_events_are_dropped() {
        let json = r#"{
            "items": [
                {"id": "1", "summary": "Rehearsal", "status": "confirmed",
                 "start": {"dateTime": "2025-06-01T18:00:00Z"}},
                {"id": "2", "summary": "Old gig", "status": "cancelled"},
                {"summary": "No id", "status": "confirmed"},
                {"id": "4", "status": "confirmed", "start": {"date": "2025-06-02"}}
            ]
        }"#;
        let page: EventsResponse = serde_json::from_str(json).unwrap();

        let events = to_fetched(page.items, "primary");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "1");
        assert_eq!(events[0].title, "Rehearsal");
        assert!(events[0].start.is_some());
        assert_eq!(events[1].title, "(No title)");
        assert_eq!(
            events[1].start,
            Some(Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_consent_url_carries_offline_access() {
        let url = consent_url("client-1", "http://localhost:8310/callback", "state-1").unwrap();
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state=state-1"));
    }
}
