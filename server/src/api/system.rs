use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;

#[get("/system/health")]
async fn get_health(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let database = match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => "up",
        Err(e) => {
            tracing::warn!("health check database probe failed: {}", e);
            "down"
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "database": database,
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_health);
}
