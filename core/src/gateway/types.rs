//! Wire DTOs shared by the gateway clients and the server that implements
//! the same contract. Everything crosses the wire in camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::detect::DetectedModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithRuns {
    #[serde(flatten)]
    pub session: Session,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

/// A persisted, immutable record of one completed modeling attempt.
/// Append-only: created once via an explicit save, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    pub code: String,
    /// For regression-family models this slot holds R² by convention.
    pub accuracy: f64,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub model_type: String,
    pub dataset_rows: Option<i64>,
    pub dataset_columns: Option<i64>,
    pub dataset_features: Option<Vec<String>>,
    pub confusion_matrix: Option<Vec<Vec<i64>>>,
    pub stdout: Option<String>,
    pub error: Option<String>,
    pub is_improved: bool,
    pub explanation: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRun {
    pub session_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub code: String,
    pub accuracy: f64,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub model_type: String,
    pub dataset_rows: Option<i64>,
    pub dataset_columns: Option<i64>,
    pub dataset_features: Option<Vec<String>>,
    pub confusion_matrix: Option<Vec<Vec<i64>>>,
    pub stdout: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub is_improved: bool,
    pub explanation: Option<String>,
}

// ---------------------------------------------------------------------------
// AI endpoint payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanDataRequest {
    pub columns: Vec<String>,
    pub sample_rows: Vec<serde_json::Value>,
    pub stats: serde_json::Value,
    pub user_feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningOperation {
    pub operation: String,
    pub column: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanDataResponse {
    pub cleaning_operations: Vec<CleaningOperation>,
    pub summary: String,
    pub data_quality_score: QualityScore,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDataRequest {
    pub columns: Vec<String>,
    pub stats: serde_json::Value,
    pub sample_rows: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlRecommendations {
    pub task_type: Option<String>,
    pub target_column: Option<String>,
    #[serde(default)]
    pub suggested_models: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDataResponse {
    pub data_description: String,
    pub insights: Vec<String>,
    #[serde(default)]
    pub suggested_visualizations: Vec<String>,
    pub ml_recommendations: Option<MlRecommendations>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeModelRequest {
    pub model_type: String,
    pub accuracy: f64,
    pub features: Vec<String>,
    pub confusion_matrix: Option<Vec<Vec<i64>>>,
    pub code: String,
    pub dataset_rows: Option<i64>,
    pub dataset_columns: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatistics {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

/// One runnable alternative-model suggestion; the orchestrator turns a batch
/// of these into experiments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedExperiment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeModelResponse {
    pub analysis: String,
    pub statistics: ModelStatistics,
    #[serde(default)]
    pub feature_experiments: Vec<SuggestedExperiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectModelRequest {
    pub code: String,
    pub stdout: String,
}

pub type DetectModelResponse = DetectedModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChatRequest {
    pub message: String,
    pub data_context: serde_json::Value,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    pub ml_recommendations: Option<MlRecommendations>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChatResponse {
    pub response: String,
    pub code: Option<String>,
    pub model_type: Option<String>,
    pub target_column: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveRequest {
    pub session_id: Uuid,
    pub latest_run: Run,
    pub code: String,
    pub all_runs: Option<Vec<Run>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResponse {
    pub diagnosis: String,
    pub suggestions: Vec<String>,
    pub improved_experiment: SuggestedExperiment,
}
