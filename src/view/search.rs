use crate::domain::events::Event;
use crate::journal::JournalRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Debounced journal search with at most one request in flight.
///
/// Every submitted query aborts the previous task, whether it is still waiting out the debounce delay or already
/// talking to the journal. Results come back as `Event::SearchCompleted` tagged with the generation that started them.
#[derive(Debug)]
pub struct SearchDispatcher {
    journal: Arc<dyn JournalRepository>,
    debounce: Duration,
    tx: Sender<Event>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl SearchDispatcher {
    pub fn new(journal: Arc<dyn JournalRepository>, debounce: Duration, tx: Sender<Event>) -> Self {
        SearchDispatcher {
            journal,
            debounce,
            tx,
            generation: 0,
            in_flight: None,
        }
    }

    #[instrument(skip(self))]
    pub fn submit(&mut self, query: String) {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let debounce = self.debounce;
        let journal = self.journal.clone();
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            sleep(debounce).await;

            let trimmed = query.trim();
            let result = if trimmed.is_empty() {
                journal.fetch_entries().await
            } else {
                journal.search_entries(trimmed).await
            };

            if tx.send(Event::SearchCompleted { generation, query, result }).await.is_err() {
                debug!("View is gone, dropping search result");
            }
        }));
    }

    /// Accepts the completion of `generation` if it belongs to the latest query.
    pub fn complete(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }

        self.in_flight = None;
        true
    }

    /// Invalidates the pending search, if any, because the view is loading fresher data itself.
    pub fn supersede(&mut self) {
        self.cancel();
        self.generation += 1;
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
            debug!(generation = self.generation, "🔎 Cancelled superseded search");
        }
    }
}

impl Drop for SearchDispatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
