use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use modelpad_core::gateway::types::Run;

/// Database shape of a run. The JSONB columns carry the serialized feature
/// list and confusion matrix; conversion back to the wire type tolerates
/// unexpected shapes by dropping the field.
#[derive(Debug, FromRow)]
pub struct RunRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    pub code: String,
    pub accuracy: f64,
    pub precision_score: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub model_type: String,
    pub dataset_rows: Option<i64>,
    pub dataset_columns: Option<i64>,
    pub dataset_features: Option<serde_json::Value>,
    pub confusion_matrix: Option<serde_json::Value>,
    pub stdout: Option<String>,
    pub error: Option<String>,
    pub is_improved: bool,
    pub explanation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RunRow> for Run {
    fn from(row: RunRow) -> Self {
        Run {
            id: row.id,
            session_id: row.session_id,
            name: row.name,
            code: row.code,
            accuracy: row.accuracy,
            precision: row.precision_score,
            recall: row.recall,
            f1_score: row.f1_score,
            model_type: row.model_type,
            dataset_rows: row.dataset_rows,
            dataset_columns: row.dataset_columns,
            dataset_features: row
                .dataset_features
                .and_then(|v| serde_json::from_value(v).ok()),
            confusion_matrix: row
                .confusion_matrix
                .and_then(|v| serde_json::from_value(v).ok()),
            stdout: row.stdout,
            error: row.error,
            is_improved: row.is_improved,
            explanation: row.explanation,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> RunRow {
        RunRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            name: "gradient boosting".to_string(),
            code: "model.fit(X, y)".to_string(),
            accuracy: 0.91,
            precision_score: Some(0.9),
            recall: None,
            f1_score: None,
            model_type: "GradientBoostingClassifier".to_string(),
            dataset_rows: Some(500),
            dataset_columns: Some(12),
            dataset_features: Some(json!(["age", "income"])),
            confusion_matrix: Some(json!([[40, 2], [5, 53]])),
            stdout: Some("ACCURACY: 0.91\n".to_string()),
            error: None,
            is_improved: true,
            explanation: Some("suggested by improve".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_field_for_field() {
        let source = row();
        let expected_id = source.id;
        let run: Run = source.into();
        assert_eq!(run.id, expected_id);
        assert_eq!(run.precision, Some(0.9));
        assert_eq!(
            run.dataset_features,
            Some(vec!["age".to_string(), "income".to_string()])
        );
        assert_eq!(run.confusion_matrix, Some(vec![vec![40, 2], vec![5, 53]]));
        assert!(run.is_improved);
    }

    #[test]
    fn malformed_jsonb_degrades_to_absent_fields() {
        let mut source = row();
        source.dataset_features = Some(json!({"not": "a list"}));
        source.confusion_matrix = Some(json!("scrambled"));
        let run: Run = source.into();
        assert!(run.dataset_features.is_none());
        assert!(run.confusion_matrix.is_none());
    }
}
