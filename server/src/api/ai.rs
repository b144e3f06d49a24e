use actix_web::{post, web, HttpResponse};
use serde_json::json;

use modelpad_core::gateway::types::{
    AnalyzeDataRequest, AnalyzeModelRequest, CleanDataRequest, DetectModelRequest, ImproveRequest,
    ModelChatRequest,
};

use crate::error::ApiError;
use crate::AppState;

#[post("/ai/clean-data")]
async fn clean_data(
    state: web::Data<AppState>,
    body: web::Json<CleanDataRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = state.ai.clean_data(&body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": payload })))
}

#[post("/ai/analyze-data")]
async fn analyze_data(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeDataRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = state.ai.analyze_data(&body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": payload })))
}

#[post("/ai/analyze-model")]
async fn analyze_model(
    state: web::Data<AppState>,
    body: web::Json<AnalyzeModelRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = state.ai.analyze_model(&body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": payload })))
}

#[post("/ai/detect-model-output")]
async fn detect_model_output(
    state: web::Data<AppState>,
    body: web::Json<DetectModelRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = state.ai.detect_model_output(&body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": payload })))
}

#[post("/ai/model-chat")]
async fn model_chat(
    state: web::Data<AppState>,
    body: web::Json<ModelChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = state.ai.model_chat(&body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": payload })))
}

#[post("/ai/improve")]
async fn improve(
    state: web::Data<AppState>,
    body: web::Json<ImproveRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = state.ai.improve(&body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": payload })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(clean_data)
        .service(analyze_data)
        .service(analyze_model)
        .service(detect_model_output)
        .service(model_chat)
        .service(improve);
}
