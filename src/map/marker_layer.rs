use crate::clustering::{Grouping, should_draw_path};
use crate::domain::{GeoEntry, GeoPoint, MarkerGroup};
use crate::map::{LayerId, MapSurface, MarkerSpec};
use tracing::{debug, info};

/// What a drawn marker opens when it is clicked.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkerTarget {
    Entry(GeoEntry),
    Group(MarkerGroup),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderSummary {
    pub singles: usize,
    pub clusters: usize,
    pub path_points: usize,
}

/// Everything drawn for the current grouping. Rebuilt from scratch, never patched.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<(LayerId, MarkerTarget)>,
    path: Option<LayerId>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every marker and the path from `surface`. Returns the number of layers removed.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) -> usize {
        let mut removed = 0;
        for (id, _) in self.markers.drain(..) {
            if surface.remove(id) {
                removed += 1;
            }
        }

        if let Some(path) = self.path.take() {
            if surface.remove(path) {
                removed += 1;
            }
        }

        debug!(removed, "🧹 Cleared marker layer");
        removed
    }

    pub fn rebuild(&mut self, surface: &mut dyn MapSurface, grouping: &Grouping, path: &[GeoPoint]) -> RenderSummary {
        self.clear(surface);

        let mut summary = RenderSummary::default();
        for (index, group) in grouping.groups.iter().enumerate() {
            let (marker, target) = if group.is_cluster() {
                summary.clusters += 1;
                let marker = MarkerSpec::Cluster {
                    count: group.len(),
                    position: group.anchor(),
                    entry_ids: group.member_ids(),
                };
                (marker, MarkerTarget::Group(group.clone()))
            } else {
                summary.singles += 1;
                let entry = group.representative();
                let marker = MarkerSpec::Single {
                    entry_id: entry.id.clone(),
                    number: index + 1,
                    label: entry.label.clone(),
                    position: group.anchor(),
                };
                (marker, MarkerTarget::Entry(entry.clone()))
            };

            let id = surface.add_marker(marker);
            self.markers.push((id, target));
        }

        if should_draw_path(grouping.mapped_count(), path) {
            self.path = Some(surface.add_polyline(path));
            summary.path_points = path.len();
        }

        info!(
            singles = summary.singles,
            clusters = summary.clusters,
            path_points = summary.path_points,
            "📍 Rendered {} marker(s)",
            self.markers.len()
        );
        summary
    }

    pub fn target(&self, id: LayerId) -> Option<&MarkerTarget> {
        self.markers.iter().find(|(marker_id, _)| *marker_id == id).map(|(_, target)| target)
    }

    #[cfg(test)]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[cfg(test)]
    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    /// Drops the bookkeeping without touching a surface, for when the surface itself is destroyed.
    pub fn forget(&mut self) {
        self.markers.clear();
        self.path = None;
    }
}
