use crate::domain::GeoEntry;
use crate::domain::events::Event;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

/// Preview card of a hovered marker.
///
/// Leaving the marker or the card does not hide it right away: a timer posts `Event::PreviewExpired` after the
/// grace delay, and moving onto the card or another marker before that cancels it.
#[derive(Debug)]
pub struct HoverPreview {
    grace: Duration,
    tx: Sender<Event>,
    preview: Option<GeoEntry>,
    generation: u64,
    pending_hide: Option<JoinHandle<()>>,
}

impl HoverPreview {
    pub fn new(grace: Duration, tx: Sender<Event>) -> Self {
        HoverPreview {
            grace,
            tx,
            preview: None,
            generation: 0,
            pending_hide: None,
        }
    }

    pub fn preview(&self) -> Option<&GeoEntry> {
        self.preview.as_ref()
    }

    pub fn show(&mut self, entry: GeoEntry) {
        self.cancel_hide();
        debug!(entry_id = entry.id, "👀 Previewing '{}'", entry.label);
        self.preview = Some(entry);
    }

    pub fn schedule_hide(&mut self) {
        if self.preview.is_none() {
            return;
        }

        self.cancel_hide();
        self.generation += 1;

        let generation = self.generation;
        let grace = self.grace;
        let tx = self.tx.clone();
        self.pending_hide = Some(tokio::spawn(async move {
            sleep(grace).await;
            if tx.send(Event::PreviewExpired(generation)).await.is_err() {
                debug!("View is gone, dropping preview expiry");
            }
        }));
    }

    /// The pointer moved onto the preview card.
    pub fn keep(&mut self) {
        self.cancel_hide();
    }

    /// Hides the preview if `generation` is the pending hide. Returns whether it was hidden.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.pending_hide.take().is_none() {
            debug!(generation, "Ignoring stale preview expiry");
            return false;
        }

        self.preview = None;
        true
    }

    /// Swaps the preview for its latest version in `entries`, or hides it once the entry is gone.
    pub fn refresh(&mut self, entries: &[GeoEntry]) {
        let Some(preview) = &self.preview else {
            return;
        };

        match entries.iter().find(|entry| entry.id == preview.id) {
            Some(entry) => self.preview = Some(entry.clone()),
            None => self.hide(),
        }
    }

    pub fn hide(&mut self) {
        self.cancel_hide();
        self.preview = None;
    }

    fn cancel_hide(&mut self) {
        if let Some(pending) = self.pending_hide.take() {
            pending.abort();
        }
    }
}

impl Drop for HoverPreview {
    fn drop(&mut self) {
        self.cancel_hide();
    }
}
