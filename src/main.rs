use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use mentor_match::config::Settings;
use mentor_match::core::Matcher;
use mentor_match::routes::{self, matching::AppState};
use mentor_match::services::{PostgresClient, RunCache, SupabaseClient, SupabaseTables};
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

fn config_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        config_error(e)
    })?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting Mentor Match service...");
    info!("Configuration loaded successfully");

    let supabase = Arc::new(
        SupabaseClient::new(
            settings.supabase.url.clone(),
            settings.supabase.api_key.clone(),
            SupabaseTables {
                mentee_preferences: settings.supabase.mentee_preferences_table.clone(),
                mentor_profiles: settings.supabase.mentor_profiles_table.clone(),
            },
            settings.supabase.timeout_secs.unwrap_or(30),
        )
        .map_err(|e| {
            error!("Failed to create Supabase client: {}", e);
            config_error(e)
        })?,
    );

    info!("Supabase client initialized");

    // Redis is optional; without it runs live in this process only
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(3600);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url() {
        Some(redis_url) => match RunCache::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Run cache initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), keeping runs in memory only", e);
                RunCache::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Run cache initialized in memory (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            RunCache::in_memory(l1_cache_size, cache_ttl)
        }
    };
    let cache = Arc::new(cache);

    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            config_error(e)
        })?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let matcher = Matcher::new(settings.matching.capacity_policy);

    info!("Matcher initialized with capacity policy: {:?}", matcher.policy());

    let app_state = AppState {
        supabase,
        cache,
        postgres,
        matcher,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
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
