use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travista_api::config::AppConfig;
use travista_api::db;
use travista_api::routes::{self, ApiGuards};
use travista_api::services::ai_provider::{CompletionProvider, OpenAiProvider};
use travista_api::services::destination_context_service::MongoDestinationIndex;
use travista_api::services::review_summary_service::MongoReviewSource;
use travista_api::services::trip_service::MongoTripStore;
use travista_api::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let client = db::mongo::create_mongo_client(&config.mongodb_uri, &config.database_name)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(
        OpenAiProvider::new(&config.ai).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?,
    );
    log::info!("AI provider: {} ({})", provider.name(), provider.model());

    let state = AppState::new(
        provider.clone(),
        Arc::new(MongoDestinationIndex::new(client.clone(), &config.database_name, provider.clone())),
        Arc::new(MongoTripStore::new(client.clone(), &config.database_name)),
        Arc::new(MongoReviewSource::new(client.clone(), &config.database_name)),
        Duration::from_millis(config.context_timeout_ms),
        &config.environment,
    );
    let guards = ApiGuards::new(&config.jwt_secret);
    let cors_origins = config.cors_origins.clone();

    log::info!(
        "Binding to {}:{} ({})",
        config.host,
        config.port,
        config.environment
    );

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .route("/health", web::get().to(routes::health::health_check))
            .configure(|cfg| routes::configure(cfg, &guards))
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
