pub mod ai;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod oracle;
pub mod provider;
pub mod storage;

// Re-export main types for convenience
pub use ai::{GeminiClient, LanguageModel, OllamaClient, OpenAIClient};
pub use config::Config;
pub use controller::{Controller, Reply, Request};
pub use dispatch::Dispatcher;
pub use model::{default_cities, Language, WeatherKind, WeatherRecord};
pub use oracle::{ModelOracle, WeatherOracle};
pub use provider::Provider;
pub use storage::{CityStore, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
