use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use modelpad_core::gateway::types::NewRun;

use crate::error::ApiError;
use crate::services::run_service::RunService;
use crate::AppState;

#[post("/runs")]
async fn create_run(
    state: web::Data<AppState>,
    body: web::Json<NewRun>,
) -> Result<HttpResponse, ApiError> {
    let run_service = RunService::new(state.db_pool.clone());

    let run = run_service.create_run(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(run))
}

#[get("/runs/{session_id}")]
async fn list_runs(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let run_service = RunService::new(state.db_pool.clone());

    let runs = run_service.list_runs(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(runs))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_run).service(list_runs);
}
