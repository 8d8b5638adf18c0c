//! The weather oracle: fabricated weather and poetic descriptions from a model.
//!
//! Both operations absorb every failure. `fetch_weather_for_city` yields `None`
//! and `generate_description` yields a localized fallback sentence, so callers
//! never see an error.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::ai::{GenerationRequest, LanguageModel, ModelError};
use crate::model::{Language, WeatherKind, WeatherRecord};

#[async_trait]
pub trait WeatherOracle: Send + Sync {
    async fn fetch_weather_for_city(&self, city: &str, language: Language) -> Option<WeatherRecord>;

    async fn generate_description(&self, kind: WeatherKind, city: &str, language: Language) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model returned an empty reply")]
    EmptyReply,
    #[error("malformed weather payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown weather type {0:?}")]
    UnknownKind(String),
}

#[derive(Deserialize)]
struct WeatherPayload {
    #[serde(rename = "type")]
    kind: String,
    temp: f64,
    high: f64,
    low: f64,
    label: String,
}

/// Response schema for the weather request, in JSON Schema form
pub fn weather_schema() -> serde_json::Value {
    let kinds: Vec<&str> = WeatherKind::all().iter().map(|k| k.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "type": { "type": "string", "enum": kinds },
            "temp": { "type": "number" },
            "high": { "type": "number" },
            "low": { "type": "number" },
            "label": { "type": "string" }
        },
        "required": ["type", "temp", "high", "low", "label"]
    })
}

pub fn weather_prompt(city: &str, language: Language) -> String {
    let lang_instruction = match language {
        Language::Chinese => "The label must be in Simplified Chinese.",
        Language::English => "The label must be in English.",
    };
    format!(
        "Generate realistic current weather data for the city: \"{}\".\n\
         {}\n\
         Map the condition strictly to one of: Sunny, Rainy, Snowy, Windy.\n\
         Return a JSON object.",
        city, lang_instruction
    )
}

pub fn description_prompt(kind: WeatherKind, city: &str, language: Language) -> String {
    let lang_prompt = match language {
        Language::Chinese => "Write in Simplified Chinese.",
        Language::English => "Write in English.",
    };
    format!(
        "Write a short, poetic, and immersive single-sentence description for the current weather: {} in {}.\n\
         {}\n\
         Make it sound premium and atmospheric, suitable for a high-end design app.\n\
         Do not use quotation marks.",
        kind, city, lang_prompt
    )
}

/// Sentence shown when the description request itself failed
pub fn failure_description(kind: WeatherKind, city: &str, language: Language) -> String {
    match language {
        Language::Chinese => format!("当前{}天气：{}", city, kind),
        Language::English => format!("Current weather in {}: {}", city, kind),
    }
}

/// Sentence shown when the model answered with nothing
pub fn empty_description(city: &str, language: Language) -> String {
    match language {
        Language::Chinese => format!("感受{}的天气之美。", city),
        Language::English => format!("Experience the atmosphere of {}.", city),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Local models like to wrap JSON in markdown fences
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn round_degrees(value: f64) -> i32 {
    value.round() as i32
}

/// Turn a raw model reply into a record for `city`, stamped with `id`.
pub fn parse_weather(
    text: &str,
    city: &str,
    language: Language,
    id: String,
) -> Result<WeatherRecord, OracleError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(OracleError::EmptyReply);
    }

    let payload: WeatherPayload = serde_json::from_str(body)?;
    let kind = WeatherKind::from_str(&payload.kind)
        .ok_or_else(|| OracleError::UnknownKind(payload.kind.clone()))?;

    let label = match language {
        Language::English => capitalize_first(&payload.label),
        Language::Chinese => payload.label,
    };

    Ok(WeatherRecord {
        id,
        city: city.to_string(),
        kind,
        temperature: round_degrees(payload.temp),
        high: round_degrees(payload.high),
        low: round_degrees(payload.low),
        label,
    })
}

fn record_id(city: &str) -> String {
    format!("{}-{}", city, chrono::Utc::now().timestamp_millis())
}

/// Oracle backed by any [`LanguageModel`]
pub struct ModelOracle<M> {
    model: M,
}

impl<M: LanguageModel> ModelOracle<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    async fn try_fetch_weather(
        &self,
        city: &str,
        language: Language,
    ) -> Result<WeatherRecord, OracleError> {
        let request = GenerationRequest::json(weather_prompt(city, language), weather_schema());
        let text = self.model.generate(&request).await?;
        parse_weather(&text, city, language, record_id(city))
    }
}

#[async_trait]
impl<M: LanguageModel> WeatherOracle for ModelOracle<M> {
    async fn fetch_weather_for_city(&self, city: &str, language: Language) -> Option<WeatherRecord> {
        match self.try_fetch_weather(city, language).await {
            Ok(record) => {
                tracing::info!(city, kind = %record.kind, "fetched weather");
                Some(record)
            }
            Err(e) => {
                tracing::error!(city, "weather fetch failed: {}", e);
                None
            }
        }
    }

    async fn generate_description(&self, kind: WeatherKind, city: &str, language: Language) -> String {
        let request = GenerationRequest::text(description_prompt(kind, city, language));
        match self.model.generate(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!(city, "description reply was empty");
                empty_description(city, language)
            }
            Err(e) => {
                tracing::error!(city, "description request failed: {}", e);
                failure_description(kind, city, language)
            }
        }
    }
}
