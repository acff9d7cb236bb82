//! HTTP client for the Dexcom Share web service.
//!
//! Authentication happens once, in [`DexcomClient::connect`]: the account
//! name is exchanged for an account id, and the account id for a session id
//! that is attached to every readings request.

use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::dexcom::types::{GlucoseReading, RawGlucoseReading};
use crate::dexcom::GlucoseProvider;
use crate::error::{Error, Result};
use crate::VERSION;

const AUTHENTICATE_ENDPOINT: &str = "General/AuthenticatePublisherAccount";
const LOGIN_ID_ENDPOINT: &str = "General/LoginPublisherAccountById";
const GLUCOSE_READINGS_ENDPOINT: &str = "Publisher/ReadPublisherLatestGlucoseValues";

const APPLICATION_ID: &str = "d89443d2-327c-4a6f-89e5-496bbb0317db";
const APPLICATION_ID_JP: &str = "d8665ade-9673-4e27-9ff6-92db4ce13d13";

/// Largest window Dexcom Share serves, in minutes.
pub const MAX_MINUTES: u32 = 1440;

/// Largest number of readings Dexcom Share returns per request.
pub const MAX_MAX_COUNT: u32 = 288;

/// User agent string for API requests.
fn user_agent() -> String {
    format!("dexcom-mcp/{} (rust)", VERSION)
}

/// Dexcom Share region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Ous,
    Jp,
}

impl Region {
    /// Base URL of the Share web service for this region.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Us => "https://share2.dexcom.com/ShareWebServices/Services",
            Self::Ous => "https://shareous1.dexcom.com/ShareWebServices/Services",
            Self::Jp => "https://share.dexcom.jp/ShareWebServices/Services",
        }
    }

    /// Application id sent with authentication requests.
    pub fn application_id(self) -> &'static str {
        match self {
            Self::Us | Self::Ous => APPLICATION_ID,
            Self::Jp => APPLICATION_ID_JP,
        }
    }
}

/// Dexcom Share account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub region: Region,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    account_name: &'a str,
    password: &'a str,
    application_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginByIdRequest<'a> {
    account_id: &'a str,
    password: &'a str,
    application_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadingsQuery<'a> {
    session_id: &'a str,
    minutes: u32,
    max_count: u32,
}

/// Error body returned by Dexcom Share on failure.
#[derive(Debug, Deserialize)]
struct DexcomErrorBody {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Authenticated Dexcom Share client.
#[derive(Debug, Clone)]
pub struct DexcomClient {
    client: Client,
    base_url: String,
    session_id: String,
}

impl DexcomClient {
    /// Authenticate against Dexcom Share and open a session.
    pub async fn connect(credentials: &Credentials) -> Result<Self> {
        Self::connect_to(credentials, credentials.region.base_url()).await
    }

    /// Authenticate against an explicit base URL.
    pub async fn connect_to(credentials: &Credentials, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let mut this = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: String::new(),
        };

        let application_id = credentials.region.application_id();

        let account_id: String = this
            .post(
                AUTHENTICATE_ENDPOINT,
                &AuthenticateRequest {
                    account_name: &credentials.username,
                    password: &credentials.password,
                    application_id,
                },
            )
            .await?;
        validate_session_uuid(&account_id).map_err(|_| {
            Error::Auth("Dexcom returned an invalid account id".to_string())
        })?;
        debug!("Dexcom account id resolved");

        let session_id: String = this
            .post(
                LOGIN_ID_ENDPOINT,
                &LoginByIdRequest {
                    account_id: &account_id,
                    password: &credentials.password,
                    application_id,
                },
            )
            .await?;
        validate_session_uuid(&session_id)?;
        debug!("Dexcom session opened");

        this.session_id = session_id;
        Ok(this)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// POST a JSON body and decode the JSON response.
    async fn post<T: Serialize, R: DeserializeOwned>(&self, endpoint: &str, body: &T) -> Result<R> {
        let response = self
            .client
            .post(self.url(endpoint))
            .header("Accept-Encoding", "application/json")
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle an API response, classifying Dexcom error bodies.
    async fn handle_response<R: DeserializeOwned>(&self, response: Response) -> Result<R> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: Option<DexcomErrorBody> = serde_json::from_str(&body).ok();
            return Err(match parsed {
                Some(DexcomErrorBody {
                    code: Some(code),
                    message,
                }) => Error::from_dexcom(status.as_u16(), &code, message.as_deref().unwrap_or("")),
                _ => Error::api(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    body,
                ),
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("Failed to parse Dexcom response: {}", e)))
    }
}

#[async_trait]
impl GlucoseProvider for DexcomClient {
    async fn get_latest_reading(&self) -> Result<GlucoseReading> {
        self.get_readings(MAX_MINUTES, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoReadings)
    }

    async fn get_readings(&self, window_minutes: u32, max_count: u32) -> Result<Vec<GlucoseReading>> {
        validate_window(window_minutes, max_count)?;
        validate_session_uuid(&self.session_id)?;

        let query = ReadingsQuery {
            session_id: &self.session_id,
            minutes: window_minutes,
            max_count,
        };

        let response = self
            .client
            .post(self.url(GLUCOSE_READINGS_ENDPOINT))
            .header("Accept-Encoding", "application/json")
            .query(&query)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let raw: Vec<RawGlucoseReading> = self.handle_response(response).await?;
        debug!("Fetched {} glucose readings", raw.len());

        raw.into_iter().map(GlucoseReading::try_from).collect()
    }
}

/// Check the readings window against what Dexcom Share accepts.
pub fn validate_window(minutes: u32, max_count: u32) -> Result<()> {
    if !(1..=MAX_MINUTES).contains(&minutes) {
        return Err(Error::InvalidArgument(format!(
            "minutes must be between 1 and {}, got {}",
            MAX_MINUTES, minutes
        )));
    }
    if !(1..=MAX_MAX_COUNT).contains(&max_count) {
        return Err(Error::InvalidArgument(format!(
            "max_count must be between 1 and {}, got {}",
            MAX_MAX_COUNT, max_count
        )));
    }
    Ok(())
}

/// Dexcom ids must be real UUIDs; the nil UUID means the login was rejected.
pub fn validate_session_uuid(id: &str) -> Result<()> {
    match Uuid::parse_str(id) {
        Ok(uuid) if !uuid.is_nil() => Ok(()),
        Ok(_) => Err(Error::Session("Dexcom returned the default session id".to_string())),
        Err(_) => Err(Error::Session(format!("Invalid session id '{}'", id))),
    }
}
