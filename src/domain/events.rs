use crate::domain::GeoEntry;
use crate::journal::{EntryPatch, JournalError};
use crate::map::LayerId;

#[derive(Debug)]
pub enum Event {
    MountMap,
    RetryMap,
    Unmount,
    Reload,
    SearchChanged(String),
    SearchCompleted {
        generation: u64,
        query: String,
        result: Result<Vec<GeoEntry>, JournalError>,
    },
    MarkerClicked(LayerId),
    MarkerHovered(LayerId),
    MarkerLeft,
    PreviewEntered,
    PreviewLeft,
    PreviewExpired(u64),
    OpenEntry(String),
    UpdateEntry {
        id: String,
        patch: EntryPatch,
    },
    DeleteEntry(String),
    CloseDetail,
}
