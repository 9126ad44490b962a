use crate::app_config::AppConfig;
use crate::domain::GeoEntry;
use crate::journal::entry_document::{EntryDocument, EntryList};
use crate::journal::{EntryPatch, JournalError, JournalRepository};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct HttpJournal {
    client: Client,
    url: String,
}

impl HttpJournal {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        HttpJournal {
            client,
            url: config.journal().url().trim_end_matches('/').to_string(),
        }
    }

    fn entries_url(&self) -> String {
        format!("{}/entries", self.url)
    }

    fn entry_url(&self, id: &str) -> String {
        format!("{}/entries/{}", self.url, id)
    }

    async fn list(&self, query: Option<&str>) -> Result<Vec<GeoEntry>, JournalError> {
        let mut request = self.client.get(self.entries_url());
        if let Some(query) = query {
            request = request.query(&[("search", query)]);
        }

        let list = checked(request.send().await?, None)?.json::<EntryList>().await?;
        Ok(list.documents.into_iter().map(GeoEntry::from).collect())
    }
}

/// Maps the statuses the view treats differently: a missing entry and a backend that is down or overloaded.
fn checked(response: Response, id: Option<&str>) -> Result<Response, JournalError> {
    match (response.status(), id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(JournalError::NotFound(id.to_string())),
        (status @ (StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT), _) => {
            Err(JournalError::Unavailable(status))
        }
        _ => Ok(response.error_for_status()?),
    }
}

#[async_trait]
impl JournalRepository for HttpJournal {
    #[instrument(skip(self))]
    async fn fetch_entries(&self) -> Result<Vec<GeoEntry>, JournalError> {
        info!("📔 Retrieving journal entries...");
        let entries = self.list(None).await?;
        info!("📔 Retrieving journal entries... OK, {} found", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn search_entries(&self, query: &str) -> Result<Vec<GeoEntry>, JournalError> {
        debug!("🔎 Searching journal entries...");
        let entries = self.list(Some(query)).await?;
        debug!("🔎 Searching journal entries... OK, {} found", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn fetch_entry(&self, id: &str) -> Result<GeoEntry, JournalError> {
        let response = self.client.get(self.entry_url(id)).send().await?;
        let document = checked(response, Some(id))?.json::<EntryDocument>().await?;
        Ok(document.into())
    }

    #[instrument(skip(self, patch))]
    async fn update_entry(&self, id: &str, patch: &EntryPatch) -> Result<GeoEntry, JournalError> {
        let response = self.client.patch(self.entry_url(id)).json(patch).send().await?;
        let document = checked(response, Some(id))?.json::<EntryDocument>().await?;
        info!("✏️ Updated entry '{}'", document.title);
        Ok(document.into())
    }

    #[instrument(skip(self))]
    async fn delete_entry(&self, id: &str) -> Result<(), JournalError> {
        let response = self.client.delete(self.entry_url(id)).send().await?;
        checked(response, Some(id))?;
        info!("🗑️ Deleted entry '{}'", id);
        Ok(())
    }
}
