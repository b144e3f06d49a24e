use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::services::dataset_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
}

/// Accepts a raw CSV body, profiles it, and stores it for later reference.
/// The profile is exactly the input shape the clean-data and analyze-data
/// endpoints consume.
#[post("/datasets")]
async fn upload_dataset(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    if body.len() > state.config.storage.max_upload_size {
        return Err(ApiError::Internal(format!(
            "upload exceeds the {} byte limit",
            state.config.storage.max_upload_size
        )));
    }

    let content = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::Internal("dataset is not valid UTF-8".to_string()))?;

    let mut profile = dataset_service::profile_csv(&query.file_name, &content)?;
    let stored_name = state
        .file_storage
        .save_dataset(content.as_bytes(), &query.file_name)
        .await?;
    profile.stored_name = Some(stored_name);

    Ok(HttpResponse::Created().json(profile))
}

#[get("/datasets")]
async fn list_datasets(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let files = state.file_storage.list_datasets().await?;
    Ok(HttpResponse::Ok().json(files))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_dataset).service(list_datasets);
}
