use crate::domain::GeoEntry;
use crate::journal::{EntryPatch, JournalError};
use async_trait::async_trait;
use std::fmt::Debug;

/// The persisted journal-entries collection. Calls are passed straight through to the backend.
#[async_trait]
pub trait JournalRepository: Debug + Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<GeoEntry>, JournalError>;

    async fn search_entries(&self, query: &str) -> Result<Vec<GeoEntry>, JournalError>;

    async fn fetch_entry(&self, id: &str) -> Result<GeoEntry, JournalError>;

    async fn update_entry(&self, id: &str, patch: &EntryPatch) -> Result<GeoEntry, JournalError>;

    async fn delete_entry(&self, id: &str) -> Result<(), JournalError>;
}
