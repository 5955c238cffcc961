use super::{RecipeStore, StoreError, GENERATED_IMAGES, RECIPES};
use crate::models::{GeneratedImage, Recipe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, serde_helpers::chrono_datetime_as_bson_datetime, Document},
    options::{FindOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};

/// Stored shape of a [`Recipe`]. `created_at` is a native BSON datetime so
/// sorting on it is chronological.
#[derive(Debug, Serialize, Deserialize)]
struct RecipeDocument {
    id: String,
    title: String,
    description: String,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    diet_type: Option<String>,
    #[serde(default)]
    prep_time: Option<String>,
    #[serde(default)]
    cook_time: Option<String>,
    #[serde(default)]
    servings: Option<i64>,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<&Recipe> for RecipeDocument {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id.clone(),
            title: r.title.clone(),
            description: r.description.clone(),
            ingredients: r.ingredients.clone(),
            instructions: r.instructions.clone(),
            cuisine: r.cuisine.clone(),
            diet_type: r.diet_type.clone(),
            prep_time: r.prep_time.clone(),
            cook_time: r.cook_time.clone(),
            servings: r.servings,
            image_base64: r.image_base64.clone(),
            created_at: r.created_at,
        }
    }
}

impl From<RecipeDocument> for Recipe {
    fn from(d: RecipeDocument) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            ingredients: d.ingredients,
            instructions: d.instructions,
            cuisine: d.cuisine,
            diet_type: d.diet_type,
            prep_time: d.prep_time,
            cook_time: d.cook_time,
            servings: d.servings,
            image_base64: d.image_base64,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeneratedImageDocument {
    recipe_id: String,
    image_base64: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<&GeneratedImage> for GeneratedImageDocument {
    fn from(g: &GeneratedImage) -> Self {
        Self {
            recipe_id: g.recipe_id.clone(),
            image_base64: g.image_base64.clone(),
            created_at: g.created_at,
        }
    }
}

/// MongoDB-backed store. Cloning shares the driver's connection pool.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = Client::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            StoreError::from(e)
        })?;
        let db = client.database(database);
        Ok(Self { client, db })
    }

    /// Unique lookup on `id` and newest-first listing on `created_at`.
    pub async fn initialize_indexes(&self) -> Result<(), StoreError> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .name("recipe_id_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_idx".to_string())
                    .build(),
            )
            .build();

        self.recipes()
            .create_indexes([id_index, created_at_index], None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create recipe indexes: {}", e);
                StoreError::from(e)
            })?;
        tracing::info!("MongoDB indexes ready");
        Ok(())
    }

    fn recipes(&self) -> Collection<RecipeDocument> {
        self.db.collection(RECIPES)
    }

    fn generated_images(&self) -> Collection<GeneratedImageDocument> {
        self.db.collection(GENERATED_IMAGES)
    }
}

#[async_trait]
impl RecipeStore for MongoStore {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError> {
        self.recipes()
            .insert_one(RecipeDocument::from(recipe), None)
            .await?;
        Ok(())
    }

    async fn find_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        let found = self.recipes().find_one(doc! { "id": id }, None).await?;
        Ok(found.map(Recipe::from))
    }

    async fn list_recipes(&self, limit: u32) -> Result<Vec<Recipe>, StoreError> {
        // A zero limit means "no limit" to MongoDB.
        if limit == 0 {
            return Ok(Vec::new());
        }
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(i64::from(limit))
            .build();
        let cursor = self.recipes().find(doc! {}, options).await?;
        let docs: Vec<RecipeDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Recipe::from).collect())
    }

    async fn sample_recipe(&self) -> Result<Option<Recipe>, StoreError> {
        let pipeline = [doc! { "$sample": { "size": 1 } }];
        let mut cursor = self.recipes().aggregate(pipeline, None).await?;
        let Some(raw) = cursor.try_next().await? else {
            return Ok(None);
        };
        decode_recipe(raw).map(Some)
    }

    async fn set_recipe_image(&self, id: &str, image_base64: &str) -> Result<bool, StoreError> {
        let result = self
            .recipes()
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "image_base64": image_base64 } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn insert_generated_image(&self, image: &GeneratedImage) -> Result<(), StoreError> {
        self.generated_images()
            .insert_one(GeneratedImageDocument::from(image), None)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}

fn decode_recipe(raw: Document) -> Result<Recipe, StoreError> {
    bson::from_document::<RecipeDocument>(raw)
        .map(Recipe::from)
        .map_err(|e| StoreError::Decode(e.to_string()))
}
