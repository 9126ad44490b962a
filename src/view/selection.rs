use crate::clustering::Grouping;
use crate::domain::{GeoEntry, MarkerGroup};
use crate::map::MarkerTarget;

/// The detail view (`entry`) and the group list view (`group`). An entry opened from the list keeps the list open.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    entry: Option<GeoEntry>,
    group: Option<MarkerGroup>,
}

impl Selection {
    pub fn entry(&self) -> Option<&GeoEntry> {
        self.entry.as_ref()
    }

    pub fn group(&self) -> Option<&MarkerGroup> {
        self.group.as_ref()
    }

    /// A singleton opens its detail, a cluster opens the list of its members.
    pub fn open(&mut self, target: &MarkerTarget) {
        match target {
            MarkerTarget::Entry(entry) => {
                self.entry = Some(entry.clone());
                self.group = None;
            }
            MarkerTarget::Group(group) => {
                self.entry = None;
                self.group = Some(group.clone());
            }
        }
    }

    pub fn open_entry(&mut self, entry: GeoEntry) {
        self.entry = Some(entry);
    }

    /// Closes the detail view if one is open, the group list otherwise.
    pub fn close(&mut self) {
        if self.entry.take().is_none() {
            self.group = None;
        }
    }

    pub fn forget(&mut self, entry_id: &str) {
        if self.entry.as_ref().is_some_and(|entry| entry.id == entry_id) {
            self.entry = None;
        }
    }

    /// Drops or refreshes selections after the entries were regrouped.
    ///
    /// A selected group is replaced by the new group with the same representative, if there is one.
    pub fn retain_visible(&mut self, entries: &[GeoEntry], grouping: &Grouping) {
        if let Some(selected) = &self.entry {
            self.entry = entries.iter().find(|entry| entry.id == selected.id).cloned();
        }

        if let Some(selected) = &self.group {
            let representative = &selected.representative().id;
            self.group = grouping
                .groups
                .iter()
                .find(|group| group.is_cluster() && &group.representative().id == representative)
                .cloned();
        }
    }
}
