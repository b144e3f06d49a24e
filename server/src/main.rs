use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use sqlx::postgres::PgPool;

mod api;
mod config;
mod error;
mod models;
mod services;
mod storage;

use config::ModelpadConfig;
use services::ai_service::AiService;
use storage::{create_db_pool, FileStorage};

pub struct AppState {
    pub db_pool: PgPool,
    pub file_storage: FileStorage,
    pub ai: AiService,
    pub config: ModelpadConfig,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = ModelpadConfig::from_env();
    let bind_addr = (config.server.host.clone(), config.server.port);

    // Initialize database
    let db_pool = create_db_pool(&config.database.url, config.database.max_connections).await?;

    // Initialize file storage and the AI provider
    let file_storage = FileStorage::new(config.storage.data_dir.clone());
    let ai = AiService::from_config(&config.ai);

    // Create app state
    let app_state = web::Data::new(AppState {
        db_pool,
        file_storage,
        ai,
        config,
    });

    // Start HTTP server
    let state = app_state.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["Content-Type", "Authorization"])
            .max_age(3600);
        for origin in &state.config.server.cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .configure(api::configure)
    })
    .bind(bind_addr)?
    .run();

    tracing::info!(
        "modelpad server started on {}:{}",
        app_state.config.server.host,
        app_state.config.server.port
    );

    server.await?;

    Ok(())
}
