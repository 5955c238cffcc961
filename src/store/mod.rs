//! Document store for recipes and generated-image audit records.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::models::{GeneratedImage, Recipe};
use async_trait::async_trait;
use thiserror::Error;

pub const RECIPES: &str = "recipes";
pub const GENERATED_IMAGES: &str = "generated_images";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("malformed document: {0}")]
    Decode(String),
}

/// Operations over the `recipes` and `generated_images` collections.
///
/// Writes are independent; there are no transactions spanning them.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError>;

    async fn find_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError>;

    /// Newest first, at most `limit` items.
    async fn list_recipes(&self, limit: u32) -> Result<Vec<Recipe>, StoreError>;

    /// One recipe picked uniformly at random, `None` when the store is empty.
    async fn sample_recipe(&self) -> Result<Option<Recipe>, StoreError>;

    /// Returns whether a recipe with that id existed.
    async fn set_recipe_image(&self, id: &str, image_base64: &str) -> Result<bool, StoreError>;

    async fn insert_generated_image(&self, image: &GeneratedImage) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Releases the underlying connection. Called once on shutdown.
    async fn close(&self) {}
}
