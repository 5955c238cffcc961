use anyhow::Context;
use cravyn::{
    build_router, cors_layer,
    config::Config,
    gemini::GeminiClient,
    recipes::RecipeService,
    routes::AppState,
    store::{MongoStore, RecipeStore},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{fmt, EnvFilter};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("loading configuration")?;

    let mongo = MongoStore::connect(&config.mongo_url, &config.db_name)
        .await
        .context("connecting to MongoDB")?;
    mongo.initialize_indexes().await.context("creating MongoDB indexes")?;
    let store: Arc<dyn RecipeStore> = Arc::new(mongo);

    let gemini = Arc::new(GeminiClient::new(&config.gemini));
    tracing::info!(
        text_model = %config.gemini.text_model,
        image_model = %config.gemini.image_model,
        "Initialized Gemini client"
    );

    let state = AppState {
        recipes: Arc::new(RecipeService::new(store.clone(), gemini.clone(), gemini)),
    };
    let app = build_router(state).layer(cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "Starting server");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    served.context("server error")
}
