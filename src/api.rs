//! REST client for the Bedrud backend
//!
//! Agents authenticate with two calls before touching the media transport:
//! an unauthenticated guest login that yields a short-lived API token, and a
//! room join that exchanges it for a LiveKit token plus the LiveKit host.

use crate::errors::AgentError;
use serde::Deserialize;
use serde_json::json;

/// A parsed meeting URL such as `https://meet.example.com/m/abc123`.
///
/// The base (`scheme://authority`) addresses the REST API; the room name is
/// the last path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingUrl {
    pub base: String,
    pub scheme: String,
    pub room_name: String,
}

impl MeetingUrl {
    /// Parse a meeting URL into API base and room name.
    pub fn parse(input: &str) -> Result<Self, AgentError> {
        let url = url::Url::parse(input)
            .map_err(|e| AgentError::InvalidUrl(format!("{}: {}", input, e)))?;

        let host = url
            .host_str()
            .ok_or_else(|| AgentError::InvalidUrl(format!("{}: missing host", input)))?;

        let base = match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };

        let room_name = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(|s| s.to_string())
            .ok_or_else(|| AgentError::InvalidUrl(format!("{}: missing room name", input)))?;

        Ok(Self {
            base,
            scheme: url.scheme().to_string(),
            room_name,
        })
    }
}

/// Response of `POST /api/auth/guest-login`.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestSession {
    pub tokens: SessionTokens,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
}

/// Response of `POST /api/room/join`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomGrant {
    pub token: String,
    #[serde(default)]
    pub livekit_host: Option<String>,
}

impl RoomGrant {
    /// Resolve the LiveKit websocket URL from the host the API returned.
    ///
    /// `http(s)` schemes are rewritten to `ws(s)`; a bare host inherits the
    /// meeting URL's security level.
    pub fn websocket_url(&self, meeting_scheme: &str) -> Result<String, AgentError> {
        let host = match self.livekit_host.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(AgentError::Join(
                    "LiveKit host not provided by API".to_string(),
                ))
            }
        };

        if let Some(rest) = host.strip_prefix("http://") {
            Ok(format!("ws://{}", rest))
        } else if let Some(rest) = host.strip_prefix("https://") {
            Ok(format!("wss://{}", rest))
        } else if host.starts_with("ws://") || host.starts_with("wss://") {
            Ok(host.to_string())
        } else if meeting_scheme == "https" {
            Ok(format!("wss://{}", host))
        } else {
            Ok(format!("ws://{}", host))
        }
    }
}

/// Thin client for the two agent-facing REST endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the given API base URL.
    ///
    /// With `insecure` set, TLS certificate validation is disabled. Meeting
    /// servers on self-signed deployments need this.
    pub fn new(base: &str, insecure: bool) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Log in as an unauthenticated guest and obtain an API access token.
    pub async fn guest_login(&self, display_name: &str) -> Result<GuestSession, AgentError> {
        let resp = self
            .http
            .post(format!("{}/api/auth/guest-login", self.base))
            .json(&json!({ "name": display_name }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Auth(format!("{}: {}", status, body)));
        }

        Ok(resp.json().await?)
    }

    /// Join a room, obtaining the LiveKit token and host.
    pub async fn join_room(&self, api_token: &str, room_name: &str) -> Result<RoomGrant, AgentError> {
        let resp = self
            .http
            .post(format!("{}/api/room/join", self.base))
            .bearer_auth(api_token)
            .json(&json!({ "roomName": room_name }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Join(format!("{}: {}", status, body)));
        }

        Ok(resp.json().await?)
    }
}
