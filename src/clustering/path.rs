use crate::domain::{GeoEntry, GeoPoint};

/// Positions of the dated, mapped entries in ascending timestamp order.
///
/// Entries with the same timestamp keep their input order.
pub fn chronological_path(entries: &[GeoEntry]) -> Vec<GeoPoint> {
    let mut dated: Vec<_> = entries
        .iter()
        .filter_map(|entry| Some((entry.timestamp?, entry.position()?)))
        .collect();
    dated.sort_by_key(|(timestamp, _)| *timestamp);

    dated.into_iter().map(|(_, point)| point).collect()
}

/// A path is only drawn when there is more than one mapped entry and at least two points to connect.
pub fn should_draw_path(mapped_count: usize, path: &[GeoPoint]) -> bool {
    mapped_count > 1 && path.len() > 1
}
