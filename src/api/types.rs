//! Wire types for the analysis API

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub ask: String,
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub analysis: Option<String>,
}

/// Body returned by `GET /model`
///
/// `model_name` is itself a JSON document: an array of model names encoded
/// as a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_name: Option<String>,
}

impl ModelInfo {
    /// First model name in the encoded array, if there is one.
    pub fn display_name(&self) -> Option<String> {
        let raw = self.model_name.as_deref()?;
        let names: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
        match names.into_iter().next()? {
            serde_json::Value::String(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}
