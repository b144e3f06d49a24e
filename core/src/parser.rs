//! Two-tier extraction of model metrics from captured stdout.
//!
//! Tier 1 scans for sentinel lines (`ACCURACY: 0.87`, `CONFUSION_MATRIX:
//! [[1,2],[3,4]]`) and is deterministic with no network involvement. Tier 2
//! is a pluggable remote detector consulted only when tier 1 finds nothing.

use async_trait::async_trait;

use crate::detect::{DatasetInfo, DetectedModel, ModelMetrics};
use crate::gateway::GatewayError;

const PREFIX_DATASET_INFO: &str = "DATASET_INFO:";
const PREFIX_MODEL_TYPE: &str = "MODEL_TYPE:";
const PREFIX_ACCURACY: &str = "ACCURACY:";
const PREFIX_PRECISION: &str = "PRECISION:";
const PREFIX_RECALL: &str = "RECALL:";
const PREFIX_F1_SCORE: &str = "F1_SCORE:";
const PREFIX_CONFUSION_MATRIX: &str = "CONFUSION_MATRIX:";

/// Tier-1 sentinel-line extraction. Returns `None` when no recognized line
/// contributed a field. A malformed payload on one line (bad number, bad
/// JSON) skips that field only; remaining lines still parse.
pub fn parse_tagged_output(stdout: &str) -> Option<DetectedModel> {
    let mut model_type = None;
    let mut metrics = ModelMetrics::default();
    let mut confusion_matrix = None;
    let mut dataset_info = None;
    let mut found = false;

    for raw in stdout.lines() {
        let line = raw.trim();
        if let Some(payload) = line.strip_prefix(PREFIX_MODEL_TYPE) {
            let name = payload.trim();
            if !name.is_empty() {
                model_type = Some(name.to_string());
                found = true;
            }
        } else if let Some(payload) = line.strip_prefix(PREFIX_ACCURACY) {
            if let Ok(v) = payload.trim().parse::<f64>() {
                metrics.accuracy = Some(v);
                found = true;
            }
        } else if let Some(payload) = line.strip_prefix(PREFIX_PRECISION) {
            if let Ok(v) = payload.trim().parse::<f64>() {
                metrics.precision = Some(v);
                found = true;
            }
        } else if let Some(payload) = line.strip_prefix(PREFIX_RECALL) {
            if let Ok(v) = payload.trim().parse::<f64>() {
                metrics.recall = Some(v);
                found = true;
            }
        } else if let Some(payload) = line.strip_prefix(PREFIX_F1_SCORE) {
            if let Ok(v) = payload.trim().parse::<f64>() {
                metrics.f1_score = Some(v);
                found = true;
            }
        } else if let Some(payload) = line.strip_prefix(PREFIX_CONFUSION_MATRIX) {
            if let Ok(matrix) = serde_json::from_str::<Vec<Vec<i64>>>(payload.trim()) {
                confusion_matrix = Some(matrix);
                found = true;
            }
        } else if let Some(payload) = line.strip_prefix(PREFIX_DATASET_INFO) {
            if let Ok(info) = serde_json::from_str::<DatasetInfo>(payload.trim()) {
                dataset_info = Some(info);
                found = true;
            }
        }
    }

    if !found {
        return None;
    }

    Some(DetectedModel {
        detected: true,
        model_type,
        metrics,
        confusion_matrix,
        dataset_info,
        summary: None,
    })
}

/// Tier-2 detector boundary. Implementations are best-effort; transport
/// failures are recoverable and treated by callers as "nothing detected".
#[async_trait]
pub trait ModelDetector: Send + Sync {
    async fn detect(
        &self,
        code: &str,
        stdout: &str,
    ) -> Result<Option<DetectedModel>, GatewayError>;
}

/// Strategy selection over the two tiers: tagged-line parsing wins outright,
/// the remote detector is only consulted when it finds nothing.
pub struct DetectionPipeline {
    remote: Option<Box<dyn ModelDetector>>,
}

impl DetectionPipeline {
    /// Tier 1 only. Used when no AI gateway is configured.
    pub fn tagged_only() -> Self {
        Self { remote: None }
    }

    pub fn with_remote(detector: Box<dyn ModelDetector>) -> Self {
        Self {
            remote: Some(detector),
        }
    }

    /// Runs the pipeline over one `(code, stdout)` pair. Remote failures
    /// degrade to `None`; they are logged and never surfaced.
    pub async fn detect(&self, code: &str, stdout: &str) -> Option<DetectedModel> {
        if let Some(found) = parse_tagged_output(stdout) {
            return Some(found);
        }
        let remote = self.remote.as_ref()?;
        match remote.detect(code, stdout).await {
            Ok(Some(model)) if model.detected => Some(model),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!("remote model detection failed: {}", err);
                None
            }
        }
    }
}
