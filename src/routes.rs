use axum::{Json, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}};
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    models::{ImageResponse, ListQuery, Recipe, RecipeRequest},
    recipes::{RecipeService, DEFAULT_LIST_LIMIT},
};

#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<RecipeService>,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to Cravyn - Your AI Recipe Discovery App" }))
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state.recipes.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "cravyn",
                "version": env!("CARGO_PKG_VERSION")
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "cravyn",
                "error": e.to_string()
            })),
        )
            .into_response(),
    }
}

pub async fn generate_recipe(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecipeRequest>,
) -> Result<Json<Recipe>, ApiError> {
    tracing::info!("🚀 Generating recipe from: {}", body.ingredients.join(", "));
    state
        .recipes
        .generate_recipe(&body)
        .await
        .map(Json)
        .map_err(ApiError::during("Failed to generate recipe"))
}

pub async fn generate_recipe_image(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ImageResponse>, ApiError> {
    let image_base64 = state
        .recipes
        .generate_image(&id)
        .await
        .map_err(ApiError::during("Failed to generate image"))?;
    Ok(Json(ImageResponse { image_base64 }))
}

pub async fn list_recipes(
    ApiQuery(query): ApiQuery<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    state
        .recipes
        .list_recipes(limit)
        .await
        .map(Json)
        .map_err(ApiError::during("Failed to fetch recipes"))
}

pub async fn get_recipe(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Recipe>, ApiError> {
    state
        .recipes
        .get_recipe(&id)
        .await
        .map(Json)
        .map_err(ApiError::during("Failed to fetch recipe"))
}

pub async fn surprise_me(State(state): State<AppState>) -> Result<Json<Recipe>, ApiError> {
    state
        .recipes
        .surprise_me()
        .await
        .map(Json)
        .map_err(ApiError::during("Failed to get surprise recipe"))
}
