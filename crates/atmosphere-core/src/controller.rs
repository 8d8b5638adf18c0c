//! Session state and the sequencing of oracle calls.
//!
//! The controller never awaits anything. Each event mutates state
//! synchronously and may hand back a [`Request`] for the dispatcher; the
//! outcome returns later through [`Controller::apply`]. Every request carries
//! the generation it was issued under, and a reply is applied only if its
//! generation is still the latest of its kind.

use crate::model::{Language, WeatherKind, WeatherRecord};
use crate::storage::{CityStore, KeyValueStore};

/// Work the controller wants done off the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Description {
        generation: u64,
        kind: WeatherKind,
        city: String,
        language: Language,
    },
    Search {
        generation: u64,
        query: String,
        language: Language,
    },
}

impl Request {
    pub fn generation(&self) -> u64 {
        match self {
            Request::Description { generation, .. } | Request::Search { generation, .. } => {
                *generation
            }
        }
    }
}

/// Outcome of a [`Request`], tagged with the same generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Description { generation: u64, text: String },
    Search { generation: u64, record: Option<WeatherRecord> },
}

pub struct Controller<S> {
    store: CityStore<S>,
    language: Language,
    pinned: Vec<WeatherRecord>,

    query: String,
    search_result: Option<WeatherRecord>,
    search_missed: bool,
    search_in_flight: bool,
    search_generation: u64,

    active: Option<WeatherRecord>,
    description: String,
    description_loading: bool,
    description_generation: u64,
    // (active id, language) the latest description request was issued for
    described: Option<(String, Language)>,

    closed: bool,
}

impl<S: KeyValueStore> Controller<S> {
    pub fn new(store: CityStore<S>, language: Language) -> Self {
        Self {
            store,
            language,
            pinned: Vec::new(),
            query: String::new(),
            search_result: None,
            search_missed: false,
            search_in_flight: false,
            search_generation: 0,
            active: None,
            description: String::new(),
            description_loading: false,
            description_generation: 0,
            described: None,
            closed: false,
        }
    }

    /// Load the pinned list and activate its first entry
    pub fn startup(&mut self) -> Option<Request> {
        self.pinned = self.store.load();
        tracing::info!(count = self.pinned.len(), "loaded pinned cities");
        self.active = self.pinned.first().cloned();
        self.refresh_description()
    }

    /// Make the pinned record with `id` the active selection
    pub fn select(&mut self, id: &str) -> Option<Request> {
        let record = self.pinned.iter().find(|c| c.id == id)?.clone();
        self.active = Some(record);
        self.refresh_description()
    }

    pub fn toggle_language(&mut self) -> Option<Request> {
        self.set_language(self.language.toggle())
    }

    pub fn set_language(&mut self, language: Language) -> Option<Request> {
        self.language = language;
        self.refresh_description()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn submit_search(&mut self) -> Option<Request> {
        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();

        self.search_generation += 1;
        self.search_in_flight = true;
        self.search_result = None;
        self.search_missed = false;
        tracing::debug!(generation = self.search_generation, %query, "search submitted");

        Some(Request::Search {
            generation: self.search_generation,
            query,
            language: self.language,
        })
    }

    /// Pin the current search result. Returns false when there is nothing to
    /// pin or the city is already pinned (compared case-insensitively).
    pub fn pin(&mut self) -> bool {
        let Some(result) = self.search_result.as_ref() else {
            return false;
        };

        let city = result.city.to_lowercase();
        if self.pinned.iter().any(|c| c.city.to_lowercase() == city) {
            tracing::debug!(city = %result.city, "city already pinned");
            return false;
        }

        if let Some(result) = self.search_result.take() {
            tracing::info!(city = %result.city, "pinned city");
            self.pinned.push(result);
        }
        self.store.save(&self.pinned);
        self.query.clear();
        true
    }

    pub fn delete(&mut self, id: &str) -> Option<Request> {
        let index = self.pinned.iter().position(|c| c.id == id)?;
        let removed = self.pinned.remove(index);
        self.store.save(&self.pinned);
        tracing::info!(city = %removed.city, "removed pinned city");

        if !self.is_active(id) {
            return None;
        }

        match self.pinned.first().cloned() {
            Some(first) => {
                self.active = Some(first);
                self.refresh_description()
            }
            None => {
                self.active = None;
                self.description.clear();
                self.description_loading = false;
                self.described = None;
                // anything still in flight now belongs to a selection that is gone
                self.description_generation += 1;
                None
            }
        }
    }

    /// Feed back the outcome of a dispatched request. A successful search
    /// activates its result, which may itself need a description.
    pub fn apply(&mut self, reply: Reply) -> Option<Request> {
        if self.closed {
            return None;
        }

        match reply {
            Reply::Description { generation, text } => {
                if generation != self.description_generation {
                    tracing::debug!(
                        generation,
                        current = self.description_generation,
                        "discarding stale description"
                    );
                    return None;
                }
                self.description = text;
                self.description_loading = false;
                None
            }
            Reply::Search { generation, record } => {
                if generation != self.search_generation {
                    tracing::debug!(
                        generation,
                        current = self.search_generation,
                        "discarding stale search result"
                    );
                    return None;
                }
                self.search_in_flight = false;
                match record {
                    Some(record) => {
                        self.search_result = Some(record.clone());
                        self.active = Some(record);
                        self.refresh_description()
                    }
                    None => {
                        self.search_missed = true;
                        None
                    }
                }
            }
        }
    }

    /// Tear down the session; replies arriving afterwards are dropped
    pub fn shutdown(&mut self) {
        self.closed = true;
    }

    fn refresh_description(&mut self) -> Option<Request> {
        let active = self.active.as_ref()?;
        let key = (active.id.clone(), self.language);
        if self.described.as_ref() == Some(&key) {
            return None;
        }

        self.described = Some(key);
        self.description_generation += 1;
        self.description_loading = true;
        tracing::debug!(
            generation = self.description_generation,
            city = %active.city,
            language = self.language.code(),
            "requesting description"
        );

        Some(Request::Description {
            generation: self.description_generation,
            kind: active.kind,
            city: active.city.clone(),
            language: self.language,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn pinned(&self) -> &[WeatherRecord] {
        &self.pinned
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_result(&self) -> Option<&WeatherRecord> {
        self.search_result.as_ref()
    }

    /// True when the latest finished search came back empty
    pub fn search_missed(&self) -> bool {
        self.search_missed
    }

    pub fn search_in_flight(&self) -> bool {
        self.search_in_flight
    }

    pub fn active(&self) -> Option<&WeatherRecord> {
        self.active.as_ref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == id)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn description_loading(&self) -> bool {
        self.description_loading
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn store(&self) -> &CityStore<S> {
        &self.store
    }
}
