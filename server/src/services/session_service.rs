use chrono::Utc;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use modelpad_core::gateway::types::Session;

use crate::error::ApiError;
use crate::models::SessionRow;

const DEFAULT_SESSION_NAME: &str = "Untitled Session";

#[derive(Clone)]
pub struct SessionService {
    db_pool: PgPool,
}

impl SessionService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn create_session(&self, name: Option<String>) -> Result<Session, ApiError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            name: name.unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO sessions (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(session.id)
        .bind(&session.name)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.db_pool)
        .await?;

        tracing::info!("created session {} ({})", session.id, session.name);
        Ok(session)
    }

    pub async fn get_session(&self, id: Uuid) -> Result<Session, ApiError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, name, created_at, updated_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        row.map(Session::from)
            .ok_or_else(|| ApiError::NotFound(format!("session {} not found", id)))
    }

    pub async fn session_exists(&self, id: Uuid) -> Result<bool, ApiError> {
        let row = sqlx::query("SELECT 1 FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(row.is_some())
    }

    /// The only mutation a session ever sees.
    pub async fn touch_session(&self, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE sessions SET updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }
}
