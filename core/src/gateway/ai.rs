//! Client for the LLM-backed endpoints. Each call forwards to the backend,
//! which owns prompt construction and response validation; this side only
//! speaks the `{data}/{error}` envelope.

use async_trait::async_trait;

use super::types::{
    AnalyzeDataRequest, AnalyzeDataResponse, AnalyzeModelRequest, AnalyzeModelResponse,
    CleanDataRequest, CleanDataResponse, DetectModelRequest, DetectModelResponse, ImproveRequest,
    ImproveResponse, ModelChatRequest, ModelChatResponse,
};
use super::{decode_enveloped, GatewayError};
use crate::detect::DetectedModel;
use crate::parser::ModelDetector;

pub struct AiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AiClient {
    /// `base_url` is the versioned API root, e.g. `http://host/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, GatewayError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/ai/{}", self.base_url, endpoint))
            .json(body)
            .send()
            .await?;
        decode_enveloped(response).await
    }

    pub async fn clean_data(
        &self,
        request: &CleanDataRequest,
    ) -> Result<CleanDataResponse, GatewayError> {
        self.post("clean-data", request).await
    }

    pub async fn analyze_data(
        &self,
        request: &AnalyzeDataRequest,
    ) -> Result<AnalyzeDataResponse, GatewayError> {
        self.post("analyze-data", request).await
    }

    pub async fn analyze_model(
        &self,
        request: &AnalyzeModelRequest,
    ) -> Result<AnalyzeModelResponse, GatewayError> {
        self.post("analyze-model", request).await
    }

    pub async fn detect_model_output(
        &self,
        request: &DetectModelRequest,
    ) -> Result<DetectModelResponse, GatewayError> {
        self.post("detect-model-output", request).await
    }

    pub async fn model_chat(
        &self,
        request: &ModelChatRequest,
    ) -> Result<ModelChatResponse, GatewayError> {
        self.post("model-chat", request).await
    }

    pub async fn improve(&self, request: &ImproveRequest) -> Result<ImproveResponse, GatewayError> {
        self.post("improve", request).await
    }
}

/// Lets the client plug straight into the detection pipeline as tier 2.
#[async_trait]
impl ModelDetector for AiClient {
    async fn detect(
        &self,
        code: &str,
        stdout: &str,
    ) -> Result<Option<DetectedModel>, GatewayError> {
        let detected = self
            .detect_model_output(&DetectModelRequest {
                code: code.to_string(),
                stdout: stdout.to_string(),
            })
            .await?;
        Ok(Some(detected))
    }
}
