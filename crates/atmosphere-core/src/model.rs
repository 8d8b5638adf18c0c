//! UI-agnostic weather types
//!
//! These are shared between the controller, the store and the oracle, and map
//! one-to-one onto the JSON kept in local storage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of conditions a city card can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherKind {
    Sunny,
    Rainy,
    Snowy,
    Windy,
}

impl WeatherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherKind::Sunny => "Sunny",
            WeatherKind::Rainy => "Rainy",
            WeatherKind::Snowy => "Snowy",
            WeatherKind::Windy => "Windy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Sunny" => Some(WeatherKind::Sunny),
            "Rainy" => Some(WeatherKind::Rainy),
            "Snowy" => Some(WeatherKind::Snowy),
            "Windy" => Some(WeatherKind::Windy),
            _ => None,
        }
    }

    pub fn all() -> [WeatherKind; 4] {
        [
            WeatherKind::Sunny,
            WeatherKind::Rainy,
            WeatherKind::Snowy,
            WeatherKind::Windy,
        ]
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One city's weather snapshot.
///
/// Field names on the wire follow the stored format (`type`, `temp`), so lists
/// written by earlier builds keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: String,
    pub city: String,
    #[serde(rename = "type")]
    pub kind: WeatherKind,
    #[serde(rename = "temp")]
    pub temperature: i32,
    pub high: i32,
    pub low: i32,
    pub label: String,
}

/// Display language for labels, descriptions and UI strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Chinese => "zh",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "zh" => Some(Language::Chinese),
            "en" => Some(Language::English),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Language::Chinese => Language::English,
            Language::English => Language::Chinese,
        }
    }
}

/// Seed list used when nothing usable is stored
pub fn default_cities() -> Vec<WeatherRecord> {
    vec![
        WeatherRecord {
            id: "1".to_string(),
            city: "Beijing".to_string(),
            kind: WeatherKind::Sunny,
            temperature: 28,
            high: 31,
            low: 22,
            label: "晴朗".to_string(),
        },
        WeatherRecord {
            id: "2".to_string(),
            city: "London".to_string(),
            kind: WeatherKind::Rainy,
            temperature: 15,
            high: 18,
            low: 12,
            label: "小雨".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_stored_field_names() {
        let record = &default_cities()[0];
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["type"], "Sunny");
        assert_eq!(value["temp"], 28);
        assert!(value.get("kind").is_none());
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"id":"x","city":"Oslo","type":"Foggy","temp":1,"high":2,"low":0,"label":"fog"}"#;
        assert!(serde_json::from_str::<WeatherRecord>(json).is_err());
    }

    #[test]
    fn test_kind_from_str_is_case_sensitive() {
        assert_eq!(WeatherKind::from_str("Windy"), Some(WeatherKind::Windy));
        assert_eq!(WeatherKind::from_str("windy"), None);
    }

    #[test]
    fn test_language_toggle_and_codes() {
        assert_eq!(Language::default(), Language::Chinese);
        assert_eq!(Language::Chinese.toggle(), Language::English);
        assert_eq!(Language::English.toggle(), Language::Chinese);
        assert_eq!(Language::from_code("EN"), Some(Language::English));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"en\"");
    }
}
