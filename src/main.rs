use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use lume_connect::config::{LoggingSettings, Settings};
use lume_connect::core::DiscoveryRanker;
use lume_connect::routes::{self, AppState};
use lume_connect::services::{
    AppwriteClient, AppwriteCollections, CacheManager, CachedDirectory, ConnectionEngine, ConnectionStore,
    MemoryConnectionStore, PostgresConnectionStore, TracingNotifier,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors (e.g. a malformed connection id)
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting Lume Connect relationship engine...");

    // Profile directory (Appwrite, read-only)
    let collections = AppwriteCollections {
        creator_profiles: settings.collection.creator_profiles.clone(),
        member_profiles: settings.collection.member_profiles.clone(),
    };

    let appwrite = AppwriteClient::new(
        settings.appwrite.endpoint.clone(),
        settings.appwrite.api_key.clone(),
        settings.appwrite.project_id.clone(),
        settings.appwrite.database_id.clone(),
        collections,
    )
    .map_err(|e| startup_error("Failed to build Appwrite client", e))?;

    info!("Appwrite client initialized");

    // Profile cache; Redis is optional
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = if settings.cache.redis_url.is_empty() {
        info!("No Redis configured, caching profiles in-process only");
        CacheManager::in_memory(l1_cache_size, cache_ttl)
    } else {
        match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), falling back to in-process cache", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        }
    };

    let directory = Arc::new(CachedDirectory::new(Arc::new(appwrite), Arc::new(cache)));

    // Connection store
    let store: Arc<dyn ConnectionStore> = if settings.database.url.is_empty() {
        warn!("No database configured, connections are kept in memory and lost on restart");
        Arc::new(MemoryConnectionStore::new())
    } else {
        let db_max_conn = settings.database.max_connections.unwrap_or(10);
        let postgres = PostgresConnectionStore::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

        info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
        Arc::new(postgres)
    };

    let ranker = DiscoveryRanker::new(settings.discovery.ranking_params());
    info!("Discovery ranker initialized with {:?}", ranker.params());

    let engine = Arc::new(ConnectionEngine::new(
        store,
        directory,
        Arc::new(TracingNotifier),
        ranker,
        settings.engine.options(),
    ));

    let app_state = AppState { engine };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
