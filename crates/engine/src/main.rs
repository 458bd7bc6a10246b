//! xsession Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xsession_engine::api;
use xsession_engine::app::App;
use xsession_engine::infrastructure::{
    app_settings::AppSettings,
    in_memory::{InMemoryPlayerRepo, InMemorySessionRepo},
    ports::ProfanityPort,
    profanity::WordListFilter,
    title_metadata::TitleMetadataService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xsession_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting xsession Engine");

    let settings = AppSettings::from_env();
    tracing::info!(
        concurrency = settings.aggregate_concurrency,
        start_time = %settings.start_time,
        "Settings loaded"
    );

    let profanity: Arc<dyn ProfanityPort> = match &settings.profanity_wordlist {
        Some(path) => match WordListFilter::with_wordlist_file(path) {
            Ok(filter) => {
                tracing::info!(path = %path.display(), "Loaded profanity word list");
                Arc::new(filter)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read word list, using built-in terms");
                Arc::new(WordListFilter::default())
            }
        },
        None => Arc::new(WordListFilter::default()),
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!("xsession/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let title_metadata = Arc::new(TitleMetadataService::with_default_backends(&client));

    // Create application
    let app = Arc::new(App::new(
        &settings,
        Arc::new(InMemorySessionRepo::new()),
        Arc::new(InMemoryPlayerRepo::new()),
        title_metadata,
        profanity,
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(settings.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = settings.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
