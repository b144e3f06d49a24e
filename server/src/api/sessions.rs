use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use modelpad_core::gateway::types::{NewSession, SessionWithRuns};

use crate::error::ApiError;
use crate::services::run_service::RunService;
use crate::services::session_service::SessionService;
use crate::AppState;

#[post("/sessions")]
async fn create_session(
    state: web::Data<AppState>,
    body: web::Json<NewSession>,
) -> Result<HttpResponse, ApiError> {
    let session_service = SessionService::new(state.db_pool.clone());

    let session = session_service.create_session(body.into_inner().name).await?;

    Ok(HttpResponse::Created().json(session))
}

#[get("/sessions/{id}")]
async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let session_id = path.into_inner();
    let session_service = SessionService::new(state.db_pool.clone());
    let run_service = RunService::new(state.db_pool.clone());

    let session = session_service.get_session(session_id).await?;
    let runs = run_service.list_runs(session_id).await?;

    Ok(HttpResponse::Ok().json(SessionWithRuns { session, runs }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_session).service(get_session);
}
