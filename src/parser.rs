//! Extraction of structured recipe data from free-form model output.
//!
//! Models usually answer with a JSON object, often wrapped in a markdown code
//! fence. Anything that does not decode to a JSON object is reported as
//! [`ParsedRecipe::Fallback`] and the caller substitutes a deterministic recipe.

use serde_json::{Map, Value};

/// Recipe fields found in model output. Absent or unusable fields are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub cuisine: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecipe {
    Parsed(RecipeDraft),
    Fallback,
}

pub fn parse_recipe_text(text: &str) -> ParsedRecipe {
    let body = strip_code_fence(text.trim());
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ParsedRecipe::Parsed(draft_from_map(&map)),
        _ => ParsedRecipe::Fallback,
    }
}

/// Returns the contents of the first ```json fence, else of the first bare
/// ``` fence, else the input unchanged. An unterminated fence runs to the end.
fn strip_code_fence(text: &str) -> &str {
    let start = if let Some(pos) = text.find("```json") {
        pos + "```json".len()
    } else if let Some(pos) = text.find("```") {
        pos + "```".len()
    } else {
        return text;
    };
    let rest = &text[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    rest[..end].trim()
}

fn draft_from_map(map: &Map<String, Value>) -> RecipeDraft {
    RecipeDraft {
        title: string_field(map, "title"),
        description: string_field(map, "description"),
        ingredients: string_list(map, "ingredients"),
        instructions: string_list(map, "instructions"),
        cuisine: string_field(map, "cuisine"),
        prep_time: string_field(map, "prep_time"),
        cook_time: string_field(map, "cook_time"),
        servings: integer_field(map, "servings"),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_to_string)
}

// Empty lists count as absent so recipes never end up without steps.
fn string_list(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = map
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(scalar_to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

fn integer_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
