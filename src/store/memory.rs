use super::{RecipeStore, StoreError};
use crate::models::{GeneratedImage, Recipe};
use async_trait::async_trait;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// In-process store backing the router tests; the binary always uses MongoDB.
#[derive(Default)]
pub struct MemoryStore {
    recipes: RwLock<HashMap<String, Recipe>>,
    images: RwLock<Vec<GeneratedImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generated_images(&self) -> Vec<GeneratedImage> {
        self.images.read().clone()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.read().len()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.recipes.write().insert(recipe.id.clone(), recipe.clone());
        Ok(())
    }

    async fn find_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().get(id).cloned())
    }

    async fn list_recipes(&self, limit: u32) -> Result<Vec<Recipe>, StoreError> {
        let mut recipes: Vec<Recipe> = self.recipes.read().values().cloned().collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recipes.truncate(limit as usize);
        Ok(recipes)
    }

    async fn sample_recipe(&self) -> Result<Option<Recipe>, StoreError> {
        let guard = self.recipes.read();
        let all: Vec<&Recipe> = guard.values().collect();
        Ok(all.choose(&mut rand::thread_rng()).map(|r| (*r).clone()))
    }

    async fn set_recipe_image(&self, id: &str, image_base64: &str) -> Result<bool, StoreError> {
        let mut guard = self.recipes.write();
        match guard.get_mut(id) {
            Some(recipe) => {
                recipe.image_base64 = Some(image_base64.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_generated_image(&self, image: &GeneratedImage) -> Result<(), StoreError> {
        self.images.write().push(image.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
