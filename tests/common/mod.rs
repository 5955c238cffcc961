//! Scripted providers and a router wired to the in-memory store.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bytes::Bytes;
use cravyn::{
    build_router,
    provider::{ImageGenerator, ProviderError, TextGenerator},
    recipes::RecipeService,
    routes::AppState,
    store::MemoryStore,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub enum TextReply {
    Text(String),
    Fail(String),
}

/// Replies with the same text for every prompt and remembers the prompts.
pub struct MockTextGenerator {
    reply: TextReply,
    pub prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn replying(text: &str) -> Self {
        Self { reply: TextReply::Text(text.to_string()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: &str) -> Self {
        Self { reply: TextReply::Fail(message.to_string()), prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(&self, _system: &str, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            TextReply::Text(text) => Ok(text.clone()),
            TextReply::Fail(message) => Err(ProviderError::Http(message.clone())),
        }
    }
}

/// Returns fixed images, optionally after a delay, and tracks how many calls
/// overlap per prompt and in total.
pub struct MockImageGenerator {
    images: Vec<Bytes>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
    in_flight: Mutex<HashMap<String, usize>>,
    peak_per_prompt: Mutex<HashMap<String, usize>>,
    in_flight_total: AtomicUsize,
    pub peak_total: AtomicUsize,
}

impl MockImageGenerator {
    pub fn returning(images: Vec<&'static [u8]>) -> Self {
        Self {
            images: images.into_iter().map(Bytes::from_static).collect(),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: Mutex::new(HashMap::new()),
            peak_per_prompt: Mutex::new(HashMap::new()),
            in_flight_total: AtomicUsize::new(0),
            peak_total: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn slow(images: Vec<&'static [u8]>, delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::returning(images) }
    }

    /// Highest number of overlapping calls whose prompt contains `needle`.
    pub fn peak_for(&self, needle: &str) -> usize {
        self.peak_per_prompt
            .lock()
            .iter()
            .filter(|(prompt, _)| prompt.contains(needle))
            .map(|(_, peak)| *peak)
            .max()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_images(&self, prompt: &str, count: u32) -> Result<Vec<Bytes>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut in_flight = self.in_flight.lock();
            let current = in_flight.entry(prompt.to_string()).or_default();
            *current += 1;
            let mut peaks = self.peak_per_prompt.lock();
            let peak = peaks.entry(prompt.to_string()).or_default();
            *peak = (*peak).max(*current);
        }
        let total = self.in_flight_total.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_total.fetch_max(total, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight_total.fetch_sub(1, Ordering::SeqCst);
        if let Some(current) = self.in_flight.lock().get_mut(prompt) {
            *current -= 1;
        }
        Ok(self.images.iter().take(count as usize).cloned().collect())
    }
}

pub const MODEL_RECIPE: &str = r#"```json
{
  "title": "Tuscan Chicken Skillet",
  "description": "Juicy chicken in a garlicky tomato sauce",
  "ingredients": ["2 chicken breasts", "3 cloves garlic", "400g tomatoes"],
  "instructions": ["Sear the chicken", "Add garlic and tomatoes", "Simmer 20 minutes"],
  "cuisine": "Italian",
  "prep_time": "10 minutes",
  "cook_time": "25 minutes",
  "servings": 2
}
```"#;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub text: Arc<MockTextGenerator>,
    pub images: Arc<MockImageGenerator>,
}

impl TestApp {
    pub fn new(text: MockTextGenerator, images: MockImageGenerator) -> Self {
        let store = Arc::new(MemoryStore::new());
        let text = Arc::new(text);
        let images = Arc::new(images);
        let service = RecipeService::new(store.clone(), text.clone(), images.clone());
        let router = build_router(AppState { recipes: Arc::new(service) });
        Self { router, store, text, images }
    }

    pub fn with_defaults() -> Self {
        Self::new(MockTextGenerator::replying(MODEL_RECIPE), MockImageGenerator::returning(vec![&b"fake-png"[..]]))
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }
}
