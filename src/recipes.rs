//! Recipe and dish-photo generation on top of the provider and store seams.

use crate::gemini::preview;
use crate::locks::KeyedLocks;
use crate::models::{GeneratedImage, Recipe, RecipeRequest};
use crate::parser::{parse_recipe_text, ParsedRecipe, RecipeDraft};
use crate::provider::{ImageGenerator, ProviderError, TextGenerator};
use crate::store::{RecipeStore, StoreError};
use base64::Engine;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_LIST_LIMIT: u32 = 20;
pub const SURPRISE_INGREDIENTS: [&str; 5] = ["chicken", "onions", "garlic", "tomatoes", "herbs"];
pub const SURPRISE_DIET: &str = "healthy";

const CHEF_SYSTEM_MESSAGE: &str =
    "You are a professional chef and recipe creator. You create amazing recipes from given ingredients.";
const DEFAULT_TITLE: &str = "Delicious Recipe";
const DEFAULT_CUISINE: &str = "International";
const DEFAULT_PREP_TIME: &str = "15 minutes";
const DEFAULT_COOK_TIME: &str = "30 minutes";
const DEFAULT_SERVINGS: i64 = 4;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Recipe not found")]
    NotFound,
    #[error("No image was generated")]
    NoImage,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    image_locks: KeyedLocks,
}

impl RecipeService {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self { store, text, images, image_locks: KeyedLocks::new() }
    }

    pub fn store(&self) -> &Arc<dyn RecipeStore> {
        &self.store
    }

    pub async fn generate_recipe(&self, request: &RecipeRequest) -> Result<Recipe, ServiceError> {
        let prompt = build_recipe_prompt(request);
        info!(ingredients = request.ingredients.len(), "🍳 Generating recipe");

        let response = self.text.generate_text(CHEF_SYSTEM_MESSAGE, &prompt).await?;
        let draft = match parse_recipe_text(&response) {
            ParsedRecipe::Parsed(draft) => draft,
            ParsedRecipe::Fallback => {
                warn!("Model output was not a JSON object, using fallback recipe: {}", preview(&response));
                fallback_draft(request)
            }
        };

        let recipe = recipe_from_draft(draft, request);
        self.store.insert_recipe(&recipe).await?;
        info!(id = %recipe.id, title = %recipe.title, "✅ Recipe saved");
        Ok(recipe)
    }

    /// Generates one dish photo, attaches it to the recipe and records it.
    /// Concurrent calls for the same recipe run one at a time.
    pub async fn generate_image(&self, recipe_id: &str) -> Result<String, ServiceError> {
        let _guard = self.image_locks.lock(recipe_id).await;

        let recipe = self
            .store
            .find_recipe(recipe_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let prompt = build_image_prompt(&recipe);
        info!(id = %recipe_id, "🎯 Generating image with prompt: {}", prompt);

        let images = self.images.generate_images(&prompt, 1).await?;
        let first = images.into_iter().next().ok_or(ServiceError::NoImage)?;
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&first);

        if !self.store.set_recipe_image(recipe_id, &image_base64).await? {
            return Err(ServiceError::NotFound);
        }
        let record = GeneratedImage {
            recipe_id: recipe_id.to_string(),
            image_base64: image_base64.clone(),
            created_at: Utc::now(),
        };
        self.store.insert_generated_image(&record).await?;

        info!(id = %recipe_id, "🖼️ Image attached: {}", preview(&image_base64));
        Ok(image_base64)
    }

    pub async fn list_recipes(&self, limit: u32) -> Result<Vec<Recipe>, ServiceError> {
        Ok(self.store.list_recipes(limit).await?)
    }

    pub async fn get_recipe(&self, recipe_id: &str) -> Result<Recipe, ServiceError> {
        self.store
            .find_recipe(recipe_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// A random stored recipe, or a freshly generated one when there are none.
    pub async fn surprise_me(&self) -> Result<Recipe, ServiceError> {
        if let Some(recipe) = self.store.sample_recipe().await? {
            return Ok(recipe);
        }
        info!("Store is empty, generating a surprise recipe");
        let request = RecipeRequest {
            ingredients: SURPRISE_INGREDIENTS.iter().map(|s| s.to_string()).collect(),
            diet_type: Some(SURPRISE_DIET.to_string()),
            cuisine: None,
        };
        self.generate_recipe(&request).await
    }
}

pub fn build_recipe_prompt(request: &RecipeRequest) -> String {
    let ingredients = request.ingredients.join(", ");
    let diet_filter = request
        .diet_type
        .as_deref()
        .map(|d| format!(" that is {d}"))
        .unwrap_or_default();
    let cuisine_filter = request
        .cuisine
        .as_deref()
        .map(|c| format!(" from {c} cuisine"))
        .unwrap_or_default();

    format!(
        "Create a detailed recipe using these ingredients: {ingredients}. \
        The recipe should be{diet_filter}{cuisine_filter}.\n\n\
        Please format your response as a JSON object with these exact fields:\n\
        - title: string (creative recipe name)\n\
        - description: string (brief appetizing description)\n\
        - ingredients: array of strings (all ingredients with measurements)\n\
        - instructions: array of strings (step-by-step cooking instructions)\n\
        - cuisine: string (type of cuisine)\n\
        - prep_time: string (preparation time like \"15 minutes\")\n\
        - cook_time: string (cooking time like \"30 minutes\")\n\
        - servings: number (how many people it serves)\n\n\
        Make sure the recipe is practical and delicious using the provided ingredients."
    )
}

pub fn build_image_prompt(recipe: &Recipe) -> String {
    let title = if recipe.title.is_empty() { "Delicious dish" } else { &recipe.title };
    let cuisine = recipe.cuisine.as_deref().unwrap_or("");
    format!(
        "A beautifully plated {title}, {cuisine} cuisine, professional food photography, \
        appetizing, vibrant colors, restaurant quality presentation"
    )
}

fn request_cuisine(request: &RecipeRequest) -> String {
    request.cuisine.clone().unwrap_or_else(|| DEFAULT_CUISINE.to_string())
}

/// Substitute used when the model output cannot be decoded at all.
pub fn fallback_draft(request: &RecipeRequest) -> RecipeDraft {
    RecipeDraft {
        title: Some(DEFAULT_TITLE.to_string()),
        description: Some("A wonderful dish made with your ingredients".to_string()),
        ingredients: Some(request.ingredients.clone()),
        instructions: Some(vec![
            "Mix all ingredients".to_string(),
            "Cook until done".to_string(),
            "Serve hot".to_string(),
        ]),
        cuisine: Some(request_cuisine(request)),
        prep_time: Some(DEFAULT_PREP_TIME.to_string()),
        cook_time: Some(DEFAULT_COOK_TIME.to_string()),
        servings: Some(DEFAULT_SERVINGS),
    }
}

/// Fills every absent field independently and stamps a new id. `diet_type`
/// always comes from the request.
pub fn recipe_from_draft(draft: RecipeDraft, request: &RecipeRequest) -> Recipe {
    Recipe {
        id: Recipe::new_id(),
        title: draft.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: draft.description.unwrap_or_else(|| "A wonderful dish".to_string()),
        ingredients: draft.ingredients.unwrap_or_else(|| request.ingredients.clone()),
        instructions: draft.instructions.unwrap_or_else(|| vec!["Cook until done".to_string()]),
        cuisine: Some(draft.cuisine.unwrap_or_else(|| request_cuisine(request))),
        diet_type: request.diet_type.clone(),
        prep_time: Some(draft.prep_time.unwrap_or_else(|| DEFAULT_PREP_TIME.to_string())),
        cook_time: Some(draft.cook_time.unwrap_or_else(|| DEFAULT_COOK_TIME.to_string())),
        servings: Some(draft.servings.unwrap_or(DEFAULT_SERVINGS)),
        image_base64: None,
        created_at: Utc::now(),
    }
}
