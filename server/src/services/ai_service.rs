//! LLM-backed endpoint logic: prompt construction, provider call, and
//! validation/normalization of the reply before it reaches the wire.
//!
//! Replies that fail structural validation become AI_ERROR rather than being
//! passed through malformed; a missing credential is CONFIG_ERROR on every
//! endpoint.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use modelpad_core::detect::DetectedModel;
use modelpad_core::gateway::types::{
    AnalyzeDataRequest, AnalyzeDataResponse, AnalyzeModelRequest, AnalyzeModelResponse,
    CleanDataRequest, CleanDataResponse, DetectModelRequest, ImproveRequest, ImproveResponse,
    ModelChatRequest, ModelChatResponse,
};

use super::provider::{ChatCompletionsProvider, LlmProvider};
use crate::config::AiConfig;
use crate::error::ApiError;

const SYSTEM_PROMPT: &str = "You are a data science assistant embedded in an ML notebook. \
     Respond with a single JSON object matching the requested schema and nothing else.";

#[derive(Clone)]
pub struct AiService {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl AiService {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        let provider = ChatCompletionsProvider::from_config(config)
            .map(|p| Arc::new(p) as Arc<dyn LlmProvider>);
        if provider.is_none() {
            tracing::warn!("no AI credential configured; AI endpoints will answer CONFIG_ERROR");
        }
        Self::new(provider)
    }

    async fn complete_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, ApiError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ApiError::Config("no provider credential configured".to_string()))?;

        let reply = provider
            .complete(SYSTEM_PROMPT, prompt)
            .await
            .map_err(|e| ApiError::Ai(e.to_string()))?;

        let json = extract_json_object(&reply)
            .ok_or_else(|| ApiError::Ai("no JSON object in provider reply".to_string()))?;

        serde_json::from_str(json)
            .map_err(|e| ApiError::Ai(format!("provider reply failed validation: {}", e)))
    }

    pub async fn clean_data(
        &self,
        request: &CleanDataRequest,
    ) -> Result<CleanDataResponse, ApiError> {
        let prompt = format!(
            "Suggest cleaning operations for this tabular dataset.\n\
             Input: {}\n\
             Reply with keys: cleaningOperations (list of {{operation, column, description}}), \
             summary, dataQualityScore {{before, after}} on a 0-100 scale, warnings (list).",
            encode(request)?
        );
        self.complete_json(&prompt).await
    }

    pub async fn analyze_data(
        &self,
        request: &AnalyzeDataRequest,
    ) -> Result<AnalyzeDataResponse, ApiError> {
        let prompt = format!(
            "Describe this tabular dataset and what could be modeled from it.\n\
             Input: {}\n\
             Reply with keys: dataDescription, insights (list), suggestedVisualizations (list), \
             mlRecommendations {{taskType, targetColumn, suggestedModels}}.",
            encode(request)?
        );
        self.complete_json(&prompt).await
    }

    pub async fn analyze_model(
        &self,
        request: &AnalyzeModelRequest,
    ) -> Result<AnalyzeModelResponse, ApiError> {
        let prompt = format!(
            "Analyze this trained model and propose alternative models to try.\n\
             Input: {}\n\
             Reply with keys: analysis, statistics {{strengths, weaknesses, recommendation}}, \
             featureExperiments (list of {{name, description, code}} with runnable Python that \
             prints its accuracy or R\u{b2} score).",
            encode(request)?
        );
        self.complete_json(&prompt).await
    }

    pub async fn detect_model_output(
        &self,
        request: &DetectModelRequest,
    ) -> Result<DetectedModel, ApiError> {
        let prompt = format!(
            "Decide whether this code and stdout describe a trained ML model, and extract its \
             metrics.\n\
             Input: {}\n\
             Reply with keys: detected (bool), modelType, metrics {{accuracy, precision, recall, \
             f1Score, loss, customMetrics}}, confusionMatrix, datasetInfo {{rows, columns, \
             features}}, summary.\n\
             Rules: regression-family estimators (linear/ridge/lasso/elastic-net/SVR/...) report \
             R\u{b2} in the accuracy slot; classification estimators report classification \
             accuracy there. Percent figures like \"95%\" must be normalized to a 0-1 fraction.",
            encode(request)?
        );
        let mut detected: DetectedModel = self.complete_json(&prompt).await?;
        normalize_bounded_metrics(&mut detected);
        Ok(detected)
    }

    pub async fn model_chat(
        &self,
        request: &ModelChatRequest,
    ) -> Result<ModelChatResponse, ApiError> {
        let prompt = format!(
            "You are helping a user build an ML model over their uploaded dataset, \
             conversationally.\n\
             Input: {}\n\
             Reply with keys: response (what to say to the user), code (runnable Python or null), \
             modelType, targetColumn, features (list).",
            encode(request)?
        );
        self.complete_json(&prompt).await
    }

    pub async fn improve(&self, request: &ImproveRequest) -> Result<ImproveResponse, ApiError> {
        let prompt = format!(
            "Diagnose why this model run underperforms and propose one improved experiment.\n\
             Input: {}\n\
             Reply with keys: diagnosis, suggestions (list), improvedExperiment {{name, code}}.",
            encode(request)?
        );
        self.complete_json(&prompt).await
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Extracts the first JSON object from a completion, tolerating markdown
/// fences and prose around it.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Belt-and-braces for the percent rule: a bounded metric that came back in
/// the 1-100 range is folded down to a fraction.
fn normalize_bounded_metrics(detected: &mut DetectedModel) {
    let metrics = &mut detected.metrics;
    for slot in [
        &mut metrics.accuracy,
        &mut metrics.precision,
        &mut metrics.recall,
        &mut metrics.f1_score,
    ] {
        if let Some(value) = slot {
            if *value > 1.0 && *value <= 100.0 {
                *value /= 100.0;
            }
        }
    }
}
