use reqwest::{Response, StatusCode, Url};

use hearth_types::api::{ErrorResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse};

use crate::error::{ClientError, Result};

/// Thin wrapper over the Hearth HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// WebSocket URL of the chat relay on the same server.
    pub fn relay_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/api/ws", ws_base)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse> {
        let resp = self
            .http
            .post(format!("{}/api/register", self.base_url))
            .json(req)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .http
            .post(format!("{}/api/login", self.base_url))
            .json(&req)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// Room history, oldest first.
    pub async fn messages(&self, token: &str, room_id: &str) -> Result<Vec<MessageResponse>> {
        let resp = self
            .http
            .get(self.messages_url(room_id)?)
            .bearer_auth(token)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// History endpoint for `room_id`, which is percent-encoded as a single
    /// path segment.
    fn messages_url(&self, room_id: &str) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "messages", room_id]);
        Ok(url)
    }
}

/// Pass successful responses through; turn error statuses into
/// [`ClientError::Server`] carrying the server's message.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| fallback_message(status));

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
