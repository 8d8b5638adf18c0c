//! Drives the controller and dispatcher together against an oracle whose
//! answers are released by the test, so replies can arrive in any order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use atmosphere_core::{
    CityStore, Controller, Dispatcher, Language, MemoryKeyValueStore, Reply, WeatherKind,
    WeatherOracle, WeatherRecord,
};
use tokio::sync::{mpsc, oneshot};

#[derive(Default)]
struct GatedOracle {
    descriptions: Mutex<HashMap<String, oneshot::Sender<String>>>,
    searches: Mutex<HashMap<String, oneshot::Sender<Option<WeatherRecord>>>>,
}

fn gate_key(city: &str, language: Language) -> String {
    format!("{}/{}", city, language.code())
}

impl GatedOracle {
    async fn release_description(&self, city: &str, language: Language, text: &str) {
        let key = gate_key(city, language);
        for _ in 0..500 {
            if let Some(tx) = self.descriptions.lock().unwrap().remove(&key) {
                tx.send(text.to_string()).unwrap();
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("no pending description for {key}");
    }

    async fn release_search(&self, city: &str, language: Language, record: Option<WeatherRecord>) {
        let key = gate_key(city, language);
        for _ in 0..500 {
            if let Some(tx) = self.searches.lock().unwrap().remove(&key) {
                tx.send(record).unwrap();
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("no pending search for {key}");
    }
}

#[async_trait]
impl WeatherOracle for GatedOracle {
    async fn fetch_weather_for_city(&self, city: &str, language: Language) -> Option<WeatherRecord> {
        let (tx, rx) = oneshot::channel();
        self.searches.lock().unwrap().insert(gate_key(city, language), tx);
        rx.await.ok().flatten()
    }

    async fn generate_description(&self, kind: WeatherKind, city: &str, language: Language) -> String {
        let (tx, rx) = oneshot::channel();
        self.descriptions
            .lock()
            .unwrap()
            .insert(gate_key(city, language), tx);
        rx.await.unwrap_or_else(|_| format!("{kind} in {city}"))
    }
}

struct Harness {
    oracle: Arc<GatedOracle>,
    dispatcher: Dispatcher,
    replies: mpsc::UnboundedReceiver<Reply>,
    controller: Controller<MemoryKeyValueStore>,
}

impl Harness {
    fn new() -> Self {
        let oracle = Arc::new(GatedOracle::default());
        let (dispatcher, replies) = Dispatcher::channel(oracle.clone());
        let controller = Controller::new(CityStore::new(MemoryKeyValueStore::new()), Language::English);
        Self {
            oracle,
            dispatcher,
            replies,
            controller,
        }
    }

    /// Wait for the next reply, apply it, and dispatch any follow-up
    async fn pump(&mut self) {
        let reply = tokio::time::timeout(Duration::from_secs(2), self.replies.recv())
            .await
            .expect("reply timed out")
            .expect("channel closed");
        if let Some(request) = self.controller.apply(reply) {
            self.dispatcher.dispatch(request);
        }
    }
}

#[tokio::test]
async fn test_late_reply_for_old_selection_is_discarded() {
    let mut h = Harness::new();
    h.dispatcher.dispatch(h.controller.startup().unwrap());
    h.dispatcher.dispatch(h.controller.select("2").unwrap());

    h.oracle
        .release_description("London", Language::English, "Rain-silvered streets.")
        .await;
    h.pump().await;
    assert_eq!(h.controller.description(), "Rain-silvered streets.");

    h.oracle
        .release_description("Beijing", Language::English, "Amber sunlight.")
        .await;
    h.pump().await;
    assert_eq!(h.controller.description(), "Rain-silvered streets.");
    assert!(!h.controller.description_loading());
}

#[tokio::test]
async fn test_early_reply_for_old_selection_is_discarded() {
    let mut h = Harness::new();
    h.dispatcher.dispatch(h.controller.startup().unwrap());
    h.dispatcher.dispatch(h.controller.select("2").unwrap());

    h.oracle
        .release_description("Beijing", Language::English, "Amber sunlight.")
        .await;
    h.pump().await;
    assert_eq!(h.controller.description(), "");
    assert!(h.controller.description_loading());

    h.oracle
        .release_description("London", Language::English, "Rain-silvered streets.")
        .await;
    h.pump().await;
    assert_eq!(h.controller.description(), "Rain-silvered streets.");
}

#[tokio::test]
async fn test_language_switch_wins_over_pending_request() {
    let mut h = Harness::new();
    h.dispatcher.dispatch(h.controller.startup().unwrap());
    h.dispatcher.dispatch(h.controller.toggle_language().unwrap());

    h.oracle
        .release_description("Beijing", Language::Chinese, "阳光洒满胡同。")
        .await;
    h.pump().await;
    h.oracle
        .release_description("Beijing", Language::English, "Amber sunlight.")
        .await;
    h.pump().await;

    // Chinese is the toggled-to language here
    assert_eq!(h.controller.language(), Language::Chinese);
    assert_eq!(h.controller.description(), "阳光洒满胡同。");
}

#[tokio::test]
async fn test_search_then_pin_end_to_end() {
    let mut h = Harness::new();
    h.dispatcher.dispatch(h.controller.startup().unwrap());
    h.oracle
        .release_description("Beijing", Language::English, "Amber sunlight.")
        .await;
    h.pump().await;

    h.controller.set_query("Tokyo");
    h.dispatcher.dispatch(h.controller.submit_search().unwrap());
    assert!(h.controller.search_in_flight());

    let tokyo = WeatherRecord {
        id: "Tokyo-1".to_string(),
        city: "Tokyo".to_string(),
        kind: WeatherKind::Snowy,
        temperature: 5,
        high: 7,
        low: 2,
        label: "Light snow".to_string(),
    };
    h.oracle
        .release_search("Tokyo", Language::English, Some(tokyo.clone()))
        .await;
    h.pump().await;
    assert!(!h.controller.search_in_flight());
    assert_eq!(h.controller.active(), Some(&tokyo));
    assert!(h.controller.description_loading());

    h.oracle
        .release_description("Tokyo", Language::English, "Snow hushes Shibuya.")
        .await;
    h.pump().await;
    assert_eq!(h.controller.description(), "Snow hushes Shibuya.");

    assert!(h.controller.pin());
    assert_eq!(h.controller.pinned().len(), 3);
    assert!(h.controller.search_result().is_none());
    assert_eq!(h.controller.query(), "");
}

#[tokio::test]
async fn test_shutdown_drops_inflight_replies() {
    let mut h = Harness::new();
    h.dispatcher.dispatch(h.controller.startup().unwrap());
    h.controller.shutdown();

    h.oracle
        .release_description("Beijing", Language::English, "Amber sunlight.")
        .await;
    h.pump().await;
    assert_eq!(h.controller.description(), "");
}
