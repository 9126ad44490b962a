use crate::app_config::AppConfig;
use crate::clustering::{Grouping, chronological_path, group_by_proximity};
use crate::domain::events::Event;
use crate::domain::{GeoEntry, MarkerGroup};
use crate::journal::{EntryPatch, JournalRepository};
use crate::map::{LayerId, MapHandle, MapLibrary, MapState, MarkerTarget};
use crate::view::{HoverPreview, SearchDispatcher, Selection};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::watch;
use tokio::sync::watch::{Receiver as WatchReceiver, Sender as WatchSender};
use tracing::{debug, error, info, instrument, warn};

/// What the detail and list views are showing, published after every event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewSnapshot {
    pub map_state: MapState,
    pub visible: usize,
    pub groups: usize,
    pub unmapped: usize,
    pub query: String,
    pub selected_entry: Option<GeoEntry>,
    pub selected_group: Option<MarkerGroup>,
    pub preview: Option<GeoEntry>,
}

/// The map view. Owns the map instance and handles every event on a single task.
#[derive(Debug)]
pub struct MapView {
    rx: Receiver<Event>,
    journal: Arc<dyn JournalRepository>,
    map: MapHandle,
    search: SearchDispatcher,
    hover: HoverPreview,
    threshold_deg: f64,
    query: String,
    entries: Vec<GeoEntry>,
    grouping: Grouping,
    selection: Selection,
    notifier_tx: WatchSender<ViewSnapshot>,
    notifier_rx: WatchReceiver<ViewSnapshot>,
}

impl MapView {
    /// `tx` must feed `rx`, timers and searches post their results back through it.
    pub fn new(rx: Receiver<Event>, tx: Sender<Event>, journal: Arc<dyn JournalRepository>, library: Arc<dyn MapLibrary>, config: &AppConfig) -> Self {
        let (notifier_tx, notifier_rx) = watch::channel(ViewSnapshot::default());

        MapView {
            rx,
            search: SearchDispatcher::new(journal.clone(), config.search().debounce(), tx.clone()),
            hover: HoverPreview::new(config.map().hover_grace(), tx),
            journal,
            map: MapHandle::new(library),
            threshold_deg: config.map().proximity_threshold_deg(),
            query: String::new(),
            entries: Vec::new(),
            grouping: Grouping::default(),
            selection: Selection::default(),
            notifier_tx,
            notifier_rx,
        }
    }

    pub fn notifier(&self) -> WatchReceiver<ViewSnapshot> {
        self.notifier_rx.clone()
    }

    /// Handles events until the view is unmounted.
    #[instrument(skip(self))]
    pub async fn listen(&mut self) {
        while let Some(event) = self.rx.recv().await {
            let flow = self.handle(event).await;
            self.publish();

            if flow.is_break() {
                break;
            }
        }
        info!("🛑 Map view stopped");
    }

    async fn handle(&mut self, event: Event) -> ControlFlow<()> {
        debug!("🔵 Received event: {:?}", event);
        match event {
            Event::MountMap => {
                if self.map.init().await.is_ok() {
                    self.render().await;
                }
            }
            Event::RetryMap => match self.map.retry().await {
                Ok(()) => self.render().await,
                Err(e) => warn!("⚠️ Retrying the map failed: {}", e),
            },
            Event::Unmount => {
                self.search.cancel();
                self.hover.hide();
                self.map.dispose();
                return ControlFlow::Break(());
            }
            Event::Reload => self.refresh().await,
            Event::SearchChanged(query) => {
                self.query = query.clone();
                self.search.submit(query);
            }
            Event::SearchCompleted { generation, query, result } => {
                if !self.search.complete(generation) {
                    debug!(generation, "🔎 Dropping result of superseded search '{}'", query);
                    return ControlFlow::Continue(());
                }

                match result {
                    Ok(entries) => {
                        info!("🔎 Search '{}' matched {} entries", query, entries.len());
                        self.replace_entries(entries).await;
                    }
                    Err(e) => {
                        warn!("⚠️ Search '{}' failed, showing no entries: {}", query, e);
                        self.replace_entries(Vec::new()).await;
                    }
                }
            }
            Event::MarkerClicked(id) => match self.marker_target(id) {
                Some(target) => {
                    self.hover.hide();
                    self.selection.open(&target);
                }
                None => warn!(marker_id = id.0, "⚠️ Clicked unknown marker {}", id),
            },
            Event::MarkerHovered(id) => match self.marker_target(id) {
                Some(MarkerTarget::Entry(entry)) => self.hover.show(entry),
                Some(MarkerTarget::Group(_)) => debug!(marker_id = id.0, "Clusters have no preview"),
                None => warn!(marker_id = id.0, "⚠️ Hovered unknown marker {}", id),
            },
            Event::MarkerLeft | Event::PreviewLeft => self.hover.schedule_hide(),
            Event::PreviewEntered => self.hover.keep(),
            Event::PreviewExpired(generation) => {
                self.hover.expire(generation);
            }
            Event::OpenEntry(id) => match self.journal.fetch_entry(&id).await {
                Ok(entry) => self.selection.open_entry(entry),
                Err(e) => warn!(entry_id = id, "⚠️ Unable to open entry: {}", e),
            },
            Event::UpdateEntry { id, patch } => self.update_entry(&id, &patch).await,
            Event::DeleteEntry(id) => match self.journal.delete_entry(&id).await {
                Ok(()) => {
                    self.selection.forget(&id);
                    self.refresh().await;
                }
                Err(e) => warn!(entry_id = id, "⚠️ Unable to delete entry: {}", e),
            },
            Event::CloseDetail => self.selection.close(),
        }

        ControlFlow::Continue(())
    }

    fn marker_target(&self, id: LayerId) -> Option<MarkerTarget> {
        self.map.target(id).cloned()
    }

    async fn update_entry(&mut self, id: &str, patch: &EntryPatch) {
        match self.journal.update_entry(id, patch).await {
            Ok(entry) => {
                if self.selection.entry().is_some_and(|selected| selected.id == entry.id) {
                    self.selection.open_entry(entry);
                }
                self.refresh().await;
            }
            Err(e) => warn!(entry_id = id, "⚠️ Unable to update entry: {}", e),
        }
    }

    /// Reloads the visible entries for the active query, bypassing the debounce.
    async fn refresh(&mut self) {
        self.search.supersede();
        let query = self.query.trim();
        let result = if query.is_empty() {
            self.journal.fetch_entries().await
        } else {
            self.journal.search_entries(query).await
        };

        match result {
            Ok(entries) => self.replace_entries(entries).await,
            Err(e) => {
                warn!("⚠️ Unable to load journal entries, showing no entries: {}", e);
                self.replace_entries(Vec::new()).await;
            }
        }
    }

    async fn replace_entries(&mut self, entries: Vec<GeoEntry>) {
        self.grouping = group_by_proximity(&entries, self.threshold_deg);
        self.entries = entries;

        if !self.grouping.unmapped.is_empty() {
            info!("🧭 {} of {} entries have no location", self.grouping.unmapped.len(), self.entries.len());
        }

        self.selection.retain_visible(&self.entries, &self.grouping);
        self.hover.refresh(&self.entries);

        self.render().await;
    }

    async fn render(&mut self) {
        if !self.map.is_ready() {
            debug!("Map is not ready ({}), deferring render", self.map.state());
            return;
        }

        let path = chronological_path(&self.entries);
        match self.map.render(&self.grouping, &path).await {
            Ok(_) => debug!(layers = self.map.layer_count(), "Map rendered"),
            Err(e) => error!("❌ Rendering the map failed: {}", e),
        }
    }

    fn publish(&self) {
        let snapshot = ViewSnapshot {
            map_state: self.map.state().clone(),
            visible: self.entries.len(),
            groups: self.grouping.groups.len(),
            unmapped: self.grouping.unmapped.len(),
            query: self.query.clone(),
            selected_entry: self.selection.entry().cloned(),
            selected_group: self.selection.group().cloned(),
            preview: self.hover.preview().cloned(),
        };

        self.notifier_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::journal::testing::InMemoryJournal;
    use crate::map::testing::FakeMapLibrary;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use test_log::test;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn entries() -> Vec<GeoEntry> {
        vec![
            GeoEntry::new("1", "Paris A").at(48.85, 2.35).on(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap()),
            GeoEntry::new("2", "Paris B").at(48.851, 2.351).on(Utc.with_ymd_and_hms(2024, 4, 3, 0, 0, 0).unwrap()),
            GeoEntry::new("3", "Tokyo").at(35.67, 139.65).on(Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap()),
            GeoEntry::new("4", "Somewhere"),
        ]
    }

    struct Harness {
        view: MapView,
        journal: Arc<InMemoryJournal>,
        library: Arc<FakeMapLibrary>,
        tx: Sender<Event>,
    }

    fn harness(journal: InMemoryJournal, library: FakeMapLibrary) -> Harness {
        let (tx, rx) = mpsc::channel(32);
        let journal = Arc::new(journal);
        let library = Arc::new(library);
        let view = MapView::new(rx, tx.clone(), journal.clone(), library.clone(), &AppConfigBuilder::new().build());

        Harness { view, journal, library, tx }
    }

    impl Harness {
        async fn handle(&mut self, event: Event) {
            let _ = self.view.handle(event).await;
            self.view.publish();
        }

        /// Handles the next event posted back by a timer or a search.
        async fn handle_next(&mut self) {
            let event = self.view.rx.recv().await.expect("Expected an event");
            self.handle(event).await;
        }

        fn snapshot(&self) -> ViewSnapshot {
            self.view.notifier().borrow().clone()
        }

        fn marker(&self, wanted: impl Fn(&MarkerTarget) -> bool) -> LayerId {
            (1..100).map(LayerId).find(|id| self.view.map.target(*id).is_some_and(&wanted)).expect("Expected a matching marker")
        }

        fn tokyo(&self) -> LayerId {
            self.marker(|target| matches!(target, MarkerTarget::Entry(entry) if entry.id == "3"))
        }

        fn paris(&self) -> LayerId {
            self.marker(|target| matches!(target, MarkerTarget::Group(_)))
        }
    }

    #[test(tokio::test)]
    async fn renders_groups_and_reports_unmapped_entries() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());

        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;

        let snapshot = h.snapshot();
        assert_eq!(snapshot.map_state, MapState::Ready);
        assert_eq!((snapshot.visible, snapshot.groups, snapshot.unmapped), (4, 2, 1));
        // Cluster, singleton and path
        assert_eq!(h.view.map.layer_count(), 3);
    }

    #[test(tokio::test)]
    async fn entries_loaded_before_the_map_are_drawn_on_mount() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());

        h.handle(Event::Reload).await;
        assert_eq!(h.view.map.layer_count(), 0);

        h.handle(Event::MountMap).await;
        assert_eq!(h.view.map.layer_count(), 3);
    }

    #[test(tokio::test)]
    async fn a_failed_map_load_is_reported_and_can_be_retried() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::failing(1));

        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;
        assert!(matches!(h.snapshot().map_state, MapState::Failed(_)));
        assert_eq!(h.snapshot().groups, 2);

        h.handle(Event::RetryMap).await;
        h.handle(Event::RetryMap).await;
        h.handle(Event::MountMap).await;

        assert_eq!(h.snapshot().map_state, MapState::Ready);
        assert_eq!(h.library.loads(), 2);
        assert_eq!(h.library.live_instances(), 1);
        assert_eq!(h.view.map.layer_count(), 3);
    }

    #[test(tokio::test)]
    async fn an_unavailable_journal_shows_no_entries() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;

        h.journal.set_unavailable(true);
        h.handle(Event::Reload).await;

        let snapshot = h.snapshot();
        assert_eq!((snapshot.visible, snapshot.groups), (0, 0));
        assert_eq!(h.view.map.layer_count(), 0);
    }

    #[test(tokio::test)]
    async fn clicking_markers_selects_an_entry_or_a_group() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;

        h.handle(Event::MarkerClicked(h.tokyo())).await;
        assert_eq!(h.snapshot().selected_entry.map(|entry| entry.label), Some("Tokyo".to_string()));

        h.handle(Event::MarkerClicked(h.paris())).await;
        let snapshot = h.snapshot();
        assert_eq!(snapshot.selected_entry, None);
        assert_eq!(snapshot.selected_group.map(|group| group.member_ids()), Some(vec!["1".to_string(), "2".to_string()]));

        h.handle(Event::OpenEntry("2".to_string())).await;
        assert_eq!(h.snapshot().selected_entry.map(|entry| entry.id), Some("2".to_string()));

        h.handle(Event::CloseDetail).await;
        h.handle(Event::CloseDetail).await;
        let snapshot = h.snapshot();
        assert_eq!((snapshot.selected_entry, snapshot.selected_group), (None, None));
    }

    #[test(tokio::test)]
    async fn deleting_a_member_regroups_and_clears_its_detail() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;
        h.handle(Event::MarkerClicked(h.paris())).await;
        h.handle(Event::OpenEntry("2".to_string())).await;

        h.handle(Event::DeleteEntry("2".to_string())).await;

        let snapshot = h.snapshot();
        assert_eq!(snapshot.visible, 3);
        assert_eq!(snapshot.groups, 2);
        assert_eq!(snapshot.selected_entry, None);
        // Paris A is a singleton now, so the list closes
        assert_eq!(snapshot.selected_group, None);
    }

    #[test(tokio::test)]
    async fn moving_an_entry_away_splits_its_cluster() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;

        let patch = EntryPatch {
            latitude: Some(51.5),
            longitude: Some(-0.12),
            ..Default::default()
        };
        h.handle(Event::UpdateEntry { id: "2".to_string(), patch }).await;

        assert_eq!(h.snapshot().groups, 3);
    }

    #[test(tokio::test(start_paused = true))]
    async fn search_results_replace_the_visible_entries() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;

        h.handle(Event::SearchChanged("par".to_string())).await;
        h.handle(Event::SearchChanged("paris".to_string())).await;
        h.handle_next().await;

        let snapshot = h.snapshot();
        assert_eq!(snapshot.query, "paris");
        assert_eq!((snapshot.visible, snapshot.groups), (2, 1));
        assert_eq!(h.journal.searches_started(), 1);
        // A cluster and a path, no singletons
        assert_eq!(h.view.map.layer_count(), 2);
    }

    #[test(tokio::test(start_paused = true))]
    async fn a_superseded_search_result_is_dropped() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::Reload).await;
        h.handle(Event::SearchChanged("tokyo".to_string())).await;
        h.handle(Event::SearchChanged("paris".to_string())).await;

        h.handle(Event::SearchCompleted {
            generation: 1,
            query: "tokyo".to_string(),
            result: Ok(vec![entries()[2].clone()]),
        })
        .await;

        assert_eq!(h.snapshot().visible, 4);
    }

    #[test(tokio::test(start_paused = true))]
    async fn a_search_pending_during_a_delete_cannot_bring_the_entry_back() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::Reload).await;
        h.handle(Event::SearchChanged("paris".to_string())).await;

        h.handle(Event::DeleteEntry("2".to_string())).await;
        assert_eq!(h.snapshot().visible, 1);

        h.handle(Event::SearchCompleted {
            generation: 1,
            query: "paris".to_string(),
            result: Ok(vec![entries()[0].clone(), entries()[1].clone()]),
        })
        .await;

        let snapshot = h.snapshot();
        assert_eq!((snapshot.visible, snapshot.groups), (1, 1));
        assert!(timeout(Duration::from_secs(5), h.view.rx.recv()).await.is_err(), "Expected the pending search to be cancelled");
    }

    #[test(tokio::test(start_paused = true))]
    async fn renaming_the_previewed_entry_updates_the_preview() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;
        h.handle(Event::MarkerHovered(h.tokyo())).await;

        let patch = EntryPatch {
            title: Some("Tokyo Tower".to_string()),
            ..Default::default()
        };
        h.handle(Event::UpdateEntry { id: "3".to_string(), patch }).await;

        assert_eq!(h.snapshot().preview.map(|entry| entry.label), Some("Tokyo Tower".to_string()));
    }

    #[test(tokio::test(start_paused = true))]
    async fn the_preview_survives_moving_onto_it_and_hides_after_leaving() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.handle(Event::MountMap).await;
        h.handle(Event::Reload).await;

        h.handle(Event::MarkerHovered(h.paris())).await;
        assert_eq!(h.snapshot().preview, None);

        h.handle(Event::MarkerHovered(h.tokyo())).await;
        h.handle(Event::MarkerLeft).await;
        h.handle(Event::PreviewEntered).await;
        assert!(timeout(Duration::from_secs(5), h.view.rx.recv()).await.is_err(), "Expected no preview expiry");
        assert_eq!(h.snapshot().preview.map(|entry| entry.id), Some("3".to_string()));

        h.handle(Event::PreviewLeft).await;
        h.handle_next().await;
        assert_eq!(h.snapshot().preview, None);
    }

    #[test(tokio::test)]
    async fn unmount_releases_the_map_and_stops_listening() {
        let mut h = harness(InMemoryJournal::new(entries()), FakeMapLibrary::default());
        h.tx.send(Event::MountMap).await.unwrap();
        h.tx.send(Event::Reload).await.unwrap();
        h.tx.send(Event::Unmount).await.unwrap();

        h.view.listen().await;

        assert_eq!(h.snapshot().map_state, MapState::Disposed);
        assert_eq!(h.library.live_instances(), 0);
        assert_eq!(h.view.map.layer_count(), 0);
    }
}
