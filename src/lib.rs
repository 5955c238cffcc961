pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod locks;
pub mod models;
pub mod parser;
pub mod provider;
pub mod recipes;
pub mod routes;
pub mod store;

use axum::{http::HeaderValue, Router, routing::{get, post}};
use tower_http::cors::{Any, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::routes::{
    generate_recipe, generate_recipe_image, get_recipe, health, list_recipes, root, surprise_me, AppState,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/health", get(health))
        .route("/api/recipes", get(list_recipes))
        .route("/api/recipes/generate", post(generate_recipe))
        .route("/api/recipes/:id", get(get_recipe))
        .route("/api/recipes/:id/generate-image", post(generate_recipe_image))
        .route("/api/surprise-me", get(surprise_me))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
