//! Google Sheets v4 over REST, authenticated as a service account.
//!
//! The service account signs an RS256 assertion which is exchanged for a
//! bearer token at Google's OAuth endpoint. Tokens are cached and reused
//! until shortly before they expire.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{ConfigError, SheetSink, SheetsConfig, SheetsError};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google accepts assertions valid for at most one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the service-account assertion.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl Claims {
    fn new(client_email: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: client_email.to_string(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: TOKEN_URL.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS) > now
    }
}

/// A [`SheetSink`] backed by one tab of a Google spreadsheet.
pub struct GoogleSheets {
    client: reqwest::Client,
    config: SheetsConfig,
    key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GoogleSheets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheets")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GoogleSheets {
    /// Create a client. Fails if the private key can't be parsed.
    pub fn new(config: SheetsConfig) -> Result<Self, ConfigError> {
        let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
            .map_err(|err| ConfigError::InvalidKey(err.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
            key,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let claims = Claims::new(&self.config.client_email, now);
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|err| SheetsError::Auth(err.to_string()))?;

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<OAuthError>(&body) {
                Ok(err) => format!(
                    "{}: {}",
                    err.error,
                    err.error_description.unwrap_or_default()
                ),
                Err(_) => format!("HTTP {status}: {body}"),
            };
            return Err(SheetsError::Auth(message));
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            expires_in = token.expires_in,
            "Obtained sheets access token"
        );
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + TimeDelta::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SheetsError> {
        let token = self.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn values_url(&self, range: &str, method: &str) -> Result<Url, SheetsError> {
        values_url(&self.config.sheet_id, &self.config.tab, range, method)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range, "")?;
        let response = self.send(self.client.get(url)).await?;
        let body: ValueRange = response.json().await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

/// The `values` endpoint for `range` of `tab`, followed by a custom
/// `method` such as `:append`.
///
/// The qualified range is one path segment, so characters like `/`, `#`
/// and `?` in a tab name are percent-encoded.
fn values_url(sheet_id: &str, tab: &str, range: &str, method: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(SHEETS_API)
        .map_err(|err| SheetsError::InvalidUrl(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| SheetsError::InvalidUrl(SHEETS_API.to_string()))?
        .push(sheet_id)
        .push("values")
        .push(&format!("{}{method}", a1_range(tab, range)));
    Ok(url)
}

/// Qualify `range` with the tab name, quoting it unless it's a plain word.
fn a1_range(tab: &str, range: &str) -> String {
    let tab = if tab.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    };
    if range.is_empty() {
        tab
    } else {
        format!("{tab}!{range}")
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSink for GoogleSheets {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        let url = self.values_url("A:A", ":append")?;
        let request = self
            .client
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [row] }));
        self.send(request).await?;
        Ok(())
    }

    async fn write_headers(&self, headers: &[String]) -> Result<(), SheetsError> {
        let request = self
            .client
            .put(self.values_url("1:1", "")?)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": [headers] }));
        self.send(request).await?;
        Ok(())
    }

    async fn read_headers(&self) -> Result<Vec<String>, SheetsError> {
        let rows = self.get_values("1:1").await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        self.get_values("").await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn claims_cover_one_hour() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let claims = Claims::new("svc@project.iam.gserviceaccount.com", now);

        assert_eq!(claims.iss, "svc@project.iam.gserviceaccount.com");
        assert_eq!(claims.aud, TOKEN_URL);
        assert_eq!(claims.scope, SPREADSHEETS_SCOPE);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_is_refreshed_before_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let token = CachedToken {
            value: "abc".into(),
            expires_at: now + TimeDelta::seconds(120),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + TimeDelta::seconds(61)));
    }

    #[test]
    fn a1_ranges() {
        assert_eq!(a1_range("Sheet1", "A:A"), "Sheet1!A:A");
        assert_eq!(a1_range("Sheet1", ""), "Sheet1");
        assert_eq!(
            a1_range("Survey Responses", "1:1"),
            "'Survey Responses'!1:1"
        );
        assert_eq!(a1_range("Bob's", "1:1"), "'Bob''s'!1:1");
    }

    #[test]
    fn values_url_appends_method_to_range() {
        let url = values_url("sheet-123", "Sheet1", "A:A", ":append").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Sheet1!A:A:append"
        );
    }

    #[test]
    fn values_url_encodes_reserved_characters_in_tab() {
        let url = values_url("sheet-123", "Q1/Q2 #1?", "1:1", "").unwrap();
        assert_eq!(
            url.path(),
            "/v4/spreadsheets/sheet-123/values/'Q1%2FQ2%20%231%3F'!1:1"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn non_string_cells_become_text() {
        assert_eq!(cell_text(json!("Yes")), "Yes");
        assert_eq!(cell_text(json!(3)), "3");
        assert_eq!(cell_text(Value::Null), "");
    }

    #[test]
    fn rejects_malformed_private_key() {
        let config = SheetsConfig {
            sheet_id: "sheet-123".into(),
            client_email: "svc@example.com".into(),
            private_key: "not a key".into(),
            tab: "Sheet1".into(),
        };
        assert!(matches!(
            GoogleSheets::new(config),
            Err(ConfigError::InvalidKey(_))
        ));
    }
}
