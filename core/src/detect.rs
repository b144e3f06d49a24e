use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metric slots shared by both detection tiers. Regression-family models
/// report R² in the `accuracy` slot by convention; anything else a detector
/// finds (mse, rmse, r2, ...) lands in `custom_metrics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub loss: Option<f64>,
    #[serde(default)]
    pub custom_metrics: BTreeMap<String, f64>,
}

impl ModelMetrics {
    /// Accuracy for ranking purposes: the accuracy slot, else the R² custom
    /// metric under either spelling.
    pub fn usable_accuracy(&self) -> Option<f64> {
        self.accuracy
            .or_else(|| self.custom_metrics.get("r2").copied())
            .or_else(|| self.custom_metrics.get("R2").copied())
    }

    pub fn is_empty(&self) -> bool {
        self.accuracy.is_none()
            && self.precision.is_none()
            && self.recall.is_none()
            && self.f1_score.is_none()
            && self.loss.is_none()
            && self.custom_metrics.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub rows: Option<u64>,
    pub columns: Option<u64>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Best-effort structured extraction of ML results from a cell's raw output.
/// Never persisted; saved runs are a separate record type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedModel {
    pub detected: bool,
    pub model_type: Option<String>,
    #[serde(default)]
    pub metrics: ModelMetrics,
    /// Square matrix, rows = actual, cols = predicted.
    pub confusion_matrix: Option<Vec<Vec<i64>>>,
    pub dataset_info: Option<DatasetInfo>,
    pub summary: Option<String>,
}

impl DetectedModel {
    pub fn usable_accuracy(&self) -> Option<f64> {
        self.metrics.usable_accuracy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r2_custom_metric_stands_in_for_accuracy() {
        let mut metrics = ModelMetrics::default();
        metrics.custom_metrics.insert("r2".to_string(), 0.81);
        assert_eq!(metrics.usable_accuracy(), Some(0.81));

        let mut upper = ModelMetrics::default();
        upper.custom_metrics.insert("R2".to_string(), 0.77);
        assert_eq!(upper.usable_accuracy(), Some(0.77));
    }

    #[test]
    fn accuracy_slot_wins_over_custom_metrics() {
        let mut metrics = ModelMetrics {
            accuracy: Some(0.9),
            ..Default::default()
        };
        metrics.custom_metrics.insert("r2".to_string(), 0.5);
        assert_eq!(metrics.usable_accuracy(), Some(0.9));
    }

    #[test]
    fn detected_model_deserializes_with_missing_optionals() {
        let parsed: DetectedModel =
            serde_json::from_str(r#"{"detected": true, "modelType": "SVC"}"#).unwrap();
        assert!(parsed.detected);
        assert_eq!(parsed.model_type.as_deref(), Some("SVC"));
        assert!(parsed.metrics.is_empty());
        assert!(parsed.confusion_matrix.is_none());
    }
}
