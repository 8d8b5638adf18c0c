//! Runs controller requests against the oracle on the tokio runtime.
//! Results come back over an mpsc channel so the event loop can apply them.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::{Reply, Request};
use crate::oracle::WeatherOracle;

#[derive(Clone)]
pub struct Dispatcher {
    oracle: Arc<dyn WeatherOracle>,
    tx: mpsc::UnboundedSender<Reply>,
}

impl Dispatcher {
    pub fn channel(oracle: Arc<dyn WeatherOracle>) -> (Self, mpsc::UnboundedReceiver<Reply>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { oracle, tx }, rx)
    }

    pub fn dispatch(&self, request: Request) -> JoinHandle<()> {
        let oracle = Arc::clone(&self.oracle);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let reply = match request {
                Request::Description {
                    generation,
                    kind,
                    city,
                    language,
                } => Reply::Description {
                    generation,
                    text: oracle.generate_description(kind, &city, language).await,
                },
                Request::Search {
                    generation,
                    query,
                    language,
                } => Reply::Search {
                    generation,
                    record: oracle.fetch_weather_for_city(&query, language).await,
                },
            };

            // The receiver is gone once the session has been torn down
            if tx.send(reply).is_err() {
                tracing::debug!("reply dropped, session closed");
            }
        })
    }
}
