use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub diet_type: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub servings: Option<i64>,
    #[serde(default)]
    pub image_base64: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Application-generated identifier; the store never assigns one.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub diet_type: Option<String>, // e.g., vegetarian, vegan, healthy
    #[serde(default)]
    pub cuisine: Option<String>,
}

/// Audit record of one image generation. `recipe_id` is a back-reference only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneratedImage {
    pub recipe_id: String,
    pub image_base64: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageResponse {
    pub image_base64: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}
