mod client;
mod entry_document;
mod error;
mod http_journal;
mod repository;
#[cfg(test)]
pub mod testing;

pub use client::authenticated_client;
pub use entry_document::EntryPatch;
pub use error::JournalError;
pub use http_journal::HttpJournal;
pub use repository::JournalRepository;
