use crate::config::ApiConfig;
use crate::credential::{Credential, CredentialValidity};
use crate::error::SessionError;
use crate::request::SessionRequest;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io;
use std::time::Duration;

/// Successful session creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub url: String,
    /// False when an idempotent request returned an existing session.
    pub is_new_session: bool,
    /// Any other response fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionCreated {
    pub fn reused(&self) -> bool {
        !self.is_new_session
    }
}

pub struct SessionClient {
    pub base_url: String,
    client: Client,
    validate_timeout: Duration,
}

impl SessionClient {
    pub fn new(cfg: &ApiConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .connect_timeout(cfg.connect_timeout())
            .user_agent(concat!("devin-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SessionError::Io(io::Error::new(io::ErrorKind::Other, err)))?;
        Ok(SessionClient {
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            client,
            validate_timeout: cfg.validate_timeout(),
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/sessions", self.base_url)
    }

    /// Submit one session-creation request. Never retried here: without the
    /// idempotent flag a resubmission may create a second session.
    pub async fn create_session(
        &self,
        request: &SessionRequest,
        credential: &Credential,
    ) -> Result<SessionCreated, SessionError> {
        let url = self.sessions_url();
        let body = request.to_json()?;
        tracing::debug!(%url, idempotent = request.idempotent, "creating session");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(network_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(network_error)?;
        tracing::debug!(status = status.as_u16(), "session response");

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }
        parse_created(status, &text)
    }

    /// Check `credential` with a cheap authenticated read.
    pub async fn validate_credential(&self, credential: &Credential) -> CredentialValidity {
        let url = self.sessions_url();
        let result = self
            .client
            .get(&url)
            .query(&[("limit", "1")])
            .bearer_auth(credential.expose())
            .timeout(self.validate_timeout)
            .send()
            .await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => return CredentialValidity::Unreachable(describe_network_error(&err)),
        };
        let status = resp.status();
        if status.is_success() {
            return CredentialValidity::Valid;
        }
        let text = resp.text().await.unwrap_or_default();
        match classify_failure(status, &text) {
            SessionError::InvalidCredential(msg) => CredentialValidity::Invalid(msg),
            SessionError::TransientServer { status, message } => {
                CredentialValidity::Unreachable(format!("HTTP {status}: {message}"))
            }
            // authenticated, the probe itself was refused
            _ => CredentialValidity::Valid,
        }
    }
}

#[derive(Deserialize)]
struct CreateSessionResponse {
    session_id: String,
    url: String,
    #[serde(default)]
    is_new_session: Option<bool>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn parse_created(status: StatusCode, body: &str) -> Result<SessionCreated, SessionError> {
    let parsed: CreateSessionResponse =
        serde_json::from_str(body).map_err(|err| SessionError::TransientServer {
            status: status.as_u16(),
            message: format!("unexpected response body: {err}"),
        })?;
    Ok(SessionCreated {
        session_id: parsed.session_id,
        url: parsed.url,
        is_new_session: parsed.is_new_session.unwrap_or(true),
        extra: parsed.extra,
    })
}

/// Map a non-success response onto the failure taxonomy.
pub fn classify_failure(status: StatusCode, body: &str) -> SessionError {
    let message = error_message(status, body);
    match status.as_u16() {
        401 | 403 => SessionError::InvalidCredential(message),
        404 => SessionError::NotFound(message),
        400..=499 => SessionError::Validation(message),
        code => SessionError::TransientServer {
            status: code,
            message,
        },
    }
}

/// Remote-provided message: `detail`, `message` or `error` from a JSON body,
/// else the raw body, else the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            match map.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn network_error(err: reqwest::Error) -> SessionError {
    SessionError::Unreachable(describe_network_error(&err))
}

fn describe_network_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
