use std::time::Duration;

use gang_core::{Agent, DebateState};
use gang_logging::{gang_debug, gang_warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{ActorError, FailureKind};

/// Remote boardroom backend.
///
/// Every method maps to one named backend operation; none of them retry.
#[async_trait::async_trait]
pub trait BackendActor: Send + Sync {
    async fn get_status(&self) -> Result<DebateState, ActorError>;

    /// Starts a debate; the backend may answer with a short acknowledgement.
    async fn start_boardroom_debate(&self, prompt: &str) -> Result<Option<String>, ActorError>;

    async fn abort_debate(&self, reason: &str) -> Result<(), ActorError>;

    async fn clear_boardroom(&self) -> Result<(), ActorError>;

    /// Routes one document chunk and returns the name of the agent that took it.
    async fn route_document(
        &self,
        filename: &str,
        preview: &str,
        size: u64,
    ) -> Result<String, ActorError>;

    async fn get_agent_registry(&self) -> Result<Vec<Agent>, ActorError>;

    async fn toggle_agent_status(&self, name: &str, enabled: bool) -> Result<(), ActorError>;

    async fn initialize_agents(&self) -> Result<(), ActorError>;
}

#[derive(Debug, Clone)]
pub struct ActorSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4943".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-over-HTTP actor: each call is `POST {base_url}/api/{method}`.
#[derive(Debug, Clone)]
pub struct HttpActor {
    base_url: reqwest::Url,
    client: reqwest::Client,
}

impl HttpActor {
    pub fn new(settings: ActorSettings) -> Result<Self, ActorError> {
        let mut base_url = reqwest::Url::parse(settings.base_url.trim())
            .map_err(|err| ActorError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ActorError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be a base url", settings.base_url),
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ActorError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn endpoint(&self, method: &str) -> Result<reqwest::Url, ActorError> {
        self.base_url
            .join(&format!("api/{method}"))
            .map_err(|err| ActorError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Posts `body` and returns the raw response bytes of a 2xx answer.
    async fn post(&self, method: &str, body: Value) -> Result<Vec<u8>, ActorError> {
        let url = self.endpoint(method)?;
        gang_debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            gang_warn!("{method} failed with {status}: {detail}");
            let message = match detail.trim() {
                "" => status.to_string(),
                detail => detail.to_string(),
            };
            return Err(ActorError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, ActorError> {
        let bytes = self.post(method, body).await?;
        decode(method, &bytes)
    }

    async fn call_void(&self, method: &str, body: Value) -> Result<(), ActorError> {
        self.post(method, body).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl BackendActor for HttpActor {
    async fn get_status(&self) -> Result<DebateState, ActorError> {
        self.call("getStatus", json!({})).await
    }

    async fn start_boardroom_debate(&self, prompt: &str) -> Result<Option<String>, ActorError> {
        let bytes = self
            .post("startBoardroomDebate", json!({ "userPrompt": prompt }))
            .await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        decode("startBoardroomDebate", &bytes)
    }

    async fn abort_debate(&self, reason: &str) -> Result<(), ActorError> {
        self.call_void("abortDebate", json!({ "userInterruption": reason }))
            .await
    }

    async fn clear_boardroom(&self) -> Result<(), ActorError> {
        self.call_void("clearBoardroom", json!({})).await
    }

    async fn route_document(
        &self,
        filename: &str,
        preview: &str,
        size: u64,
    ) -> Result<String, ActorError> {
        self.call(
            "routeDocument",
            json!({
                "filename": filename,
                "filePreview": preview,
                "fileSize": size,
            }),
        )
        .await
    }

    async fn get_agent_registry(&self) -> Result<Vec<Agent>, ActorError> {
        self.call("getAgentRegistry", json!({})).await
    }

    async fn toggle_agent_status(&self, name: &str, enabled: bool) -> Result<(), ActorError> {
        self.call_void(
            "toggleAgentStatus",
            json!({ "agentName": name, "status": enabled }),
        )
        .await
    }

    async fn initialize_agents(&self) -> Result<(), ActorError> {
        self.call_void("initializeAgents", json!({})).await
    }
}

fn decode<T: DeserializeOwned>(method: &str, bytes: &[u8]) -> Result<T, ActorError> {
    serde_json::from_slice(bytes).map_err(|err| {
        ActorError::new(
            FailureKind::Decode,
            format!("{method} returned an unexpected payload: {err}"),
        )
    })
}

fn map_reqwest_error(err: reqwest::Error) -> ActorError {
    if err.is_timeout() {
        return ActorError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ActorError::new(FailureKind::Decode, err.to_string());
    }
    ActorError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let actor = HttpActor::new(ActorSettings {
            base_url: "http://localhost:8000/gang".into(),
            ..ActorSettings::default()
        })
        .unwrap();
        assert_eq!(
            actor.endpoint("getStatus").unwrap().as_str(),
            "http://localhost:8000/gang/api/getStatus"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = HttpActor::new(ActorSettings {
            base_url: "not a url".into(),
            ..ActorSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
