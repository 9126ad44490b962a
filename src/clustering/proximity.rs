use crate::domain::{GeoEntry, GeoPoint, MarkerGroup};
use tracing::{debug, instrument};

/// Maximum Euclidean distance, in degrees, between an anchor and the entries that join it.
pub const DEFAULT_PROXIMITY_THRESHOLD_DEG: f64 = 0.05;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouping {
    pub groups: Vec<MarkerGroup>,
    /// Entries without a valid position, in input order.
    pub unmapped: Vec<GeoEntry>,
}

impl Grouping {
    pub fn mapped_count(&self) -> usize {
        self.groups.iter().map(MarkerGroup::len).sum()
    }
}

/// Greedy first-anchor grouping.
///
/// Entries are visited in input order. An unassigned entry becomes the anchor of a new group and claims every
/// later unassigned entry strictly closer than `threshold_deg` to it. Anchors are never recomputed and groups are
/// never merged, so the result depends on input order: an entry near two anchors joins the one visited first.
///
/// A non-positive or NaN threshold yields one group per mapped entry.
#[instrument(skip(entries), fields(entries = entries.len()))]
pub fn group_by_proximity(entries: &[GeoEntry], threshold_deg: f64) -> Grouping {
    let mut unmapped = Vec::new();
    let mut mapped: Vec<(&GeoEntry, GeoPoint)> = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.position() {
            Some(point) => mapped.push((entry, point)),
            None => unmapped.push(entry.clone()),
        }
    }

    let mut assigned = vec![false; mapped.len()];
    let mut groups = Vec::new();

    for i in 0..mapped.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;

        let (anchor_entry, anchor) = mapped[i];
        let mut group = MarkerGroup::new(anchor_entry.clone(), anchor);

        // Everything before `i` is already assigned
        for j in (i + 1)..mapped.len() {
            let (entry, point) = mapped[j];
            if !assigned[j] && anchor.distance_deg(&point) < threshold_deg {
                assigned[j] = true;
                group.push(entry.clone());
            }
        }

        groups.push(group);
    }

    debug!(groups = groups.len(), unmapped = unmapped.len(), "Grouped entries by proximity");
    Grouping { groups, unmapped }
}
