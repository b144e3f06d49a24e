use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use modelpad_core::gateway::types::Session;

#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
