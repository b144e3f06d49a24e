//! Client for the session/run persistence endpoints.

use uuid::Uuid;

use super::types::{NewRun, NewSession, Run, Session, SessionWithRuns};
use super::{decode_plain, GatewayError};

pub struct SessionClient {
    client: reqwest::Client,
    base_url: String,
}

impl SessionClient {
    /// `base_url` is the versioned API root, e.g. `http://host/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_session(&self, name: Option<String>) -> Result<Session, GatewayError> {
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(&NewSession { name })
            .send()
            .await?;
        decode_plain(response).await
    }

    pub async fn get_session(&self, id: Uuid) -> Result<SessionWithRuns, GatewayError> {
        let response = self
            .client
            .get(format!("{}/sessions/{}", self.base_url, id))
            .send()
            .await?;
        decode_plain(response).await
    }

    pub async fn save_run(&self, run: &NewRun) -> Result<Run, GatewayError> {
        let response = self
            .client
            .post(format!("{}/runs", self.base_url))
            .json(run)
            .send()
            .await?;
        decode_plain(response).await
    }

    /// Runs for one session, already sorted by accuracy descending.
    pub async fn list_runs(&self, session_id: Uuid) -> Result<Vec<Run>, GatewayError> {
        let response = self
            .client
            .get(format!("{}/runs/{}", self.base_url, session_id))
            .send()
            .await?;
        decode_plain(response).await
    }
}
