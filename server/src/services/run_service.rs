use chrono::Utc;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use modelpad_core::gateway::types::{NewRun, Run};

use crate::error::ApiError;
use crate::models::RunRow;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct RunService {
    db_pool: PgPool,
}

impl RunService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Persists one run. Runs are append-only; there is no update path.
    /// Saving also touches the owning session's `updated_at`.
    pub async fn create_run(&self, data: NewRun) -> Result<Run, ApiError> {
        let sessions = SessionService::new(self.db_pool.clone());
        if !sessions.session_exists(data.session_id).await? {
            return Err(ApiError::NotFound(format!(
                "session {} not found",
                data.session_id
            )));
        }

        let run = Run {
            id: Uuid::new_v4(),
            session_id: data.session_id,
            name: data.name,
            code: data.code,
            accuracy: data.accuracy,
            precision: data.precision,
            recall: data.recall,
            f1_score: data.f1_score,
            model_type: data.model_type,
            dataset_rows: data.dataset_rows,
            dataset_columns: data.dataset_columns,
            dataset_features: data.dataset_features,
            confusion_matrix: data.confusion_matrix,
            stdout: data.stdout,
            error: data.error,
            is_improved: data.is_improved,
            explanation: data.explanation,
            created_at: Utc::now(),
        };

        let dataset_features = run
            .dataset_features
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let confusion_matrix = run
            .confusion_matrix
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        sqlx::query(
            "INSERT INTO runs (id, session_id, name, code, accuracy, precision_score, recall, \
             f1_score, model_type, dataset_rows, dataset_columns, dataset_features, \
             confusion_matrix, stdout, error, is_improved, explanation, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(run.id)
        .bind(run.session_id)
        .bind(&run.name)
        .bind(&run.code)
        .bind(run.accuracy)
        .bind(run.precision)
        .bind(run.recall)
        .bind(run.f1_score)
        .bind(&run.model_type)
        .bind(run.dataset_rows)
        .bind(run.dataset_columns)
        .bind(dataset_features)
        .bind(confusion_matrix)
        .bind(&run.stdout)
        .bind(&run.error)
        .bind(run.is_improved)
        .bind(&run.explanation)
        .bind(run.created_at)
        .execute(&self.db_pool)
        .await?;

        sessions.touch_session(run.session_id).await?;

        tracing::info!(
            "saved run {} for session {} (accuracy {})",
            run.id,
            run.session_id,
            run.accuracy
        );
        Ok(run)
    }

    /// Runs for one session, sorted by accuracy descending for the
    /// leaderboard; 404 when the session is unknown.
    pub async fn list_runs(&self, session_id: Uuid) -> Result<Vec<Run>, ApiError> {
        let sessions = SessionService::new(self.db_pool.clone());
        if !sessions.session_exists(session_id).await? {
            return Err(ApiError::NotFound(format!(
                "session {} not found",
                session_id
            )));
        }

        let rows = sqlx::query_as::<_, RunRow>(
            "SELECT id, session_id, name, code, accuracy, precision_score, recall, f1_score, \
             model_type, dataset_rows, dataset_columns, dataset_features, confusion_matrix, \
             stdout, error, is_improved, explanation, created_at \
             FROM runs WHERE session_id = $1 \
             ORDER BY accuracy DESC, created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Run::from).collect())
    }
}
