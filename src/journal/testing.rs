use crate::domain::GeoEntry;
use crate::journal::{EntryPatch, JournalError, JournalRepository};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Journal kept in memory. Searches match labels case-insensitively and can be slowed down.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    entries: Mutex<Vec<GeoEntry>>,
    search_delay: Duration,
    unavailable: AtomicBool,
    searches_started: AtomicUsize,
    searches_finished: AtomicUsize,
}

impl InMemoryJournal {
    pub fn new(entries: Vec<GeoEntry>) -> Self {
        InMemoryJournal {
            entries: Mutex::new(entries),
            ..Default::default()
        }
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn searches_started(&self) -> usize {
        self.searches_started.load(Ordering::SeqCst)
    }

    pub fn searches_finished(&self) -> usize {
        self.searches_finished.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), JournalError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(JournalError::Unavailable(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for InMemoryJournal {
    async fn fetch_entries(&self) -> Result<Vec<GeoEntry>, JournalError> {
        self.check_available()?;
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn search_entries(&self, query: &str) -> Result<Vec<GeoEntry>, JournalError> {
        self.searches_started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.search_delay).await;
        self.check_available()?;

        let query = query.to_lowercase();
        let entries = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.label.to_lowercase().contains(&query))
            .cloned()
            .collect();
        self.searches_finished.fetch_add(1, Ordering::SeqCst);
        Ok(entries)
    }

    async fn fetch_entry(&self, id: &str) -> Result<GeoEntry, JournalError> {
        self.check_available()?;
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| JournalError::NotFound(id.to_string()))
    }

    async fn update_entry(&self, id: &str, patch: &EntryPatch) -> Result<GeoEntry, JournalError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.iter_mut().find(|entry| entry.id == id).ok_or_else(|| JournalError::NotFound(id.to_string()))?;
        if let Some(title) = &patch.title {
            entry.label = title.clone();
        }
        if patch.latitude.is_some() {
            entry.lat = patch.latitude;
        }
        if patch.longitude.is_some() {
            entry.lng = patch.longitude;
        }
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: &str) -> Result<(), JournalError> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(JournalError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
