use crate::domain::GeoPoint;
use chrono::{DateTime, Utc};

/// A journal entry as seen by the map: where it was written, what it is called and when.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoEntry {
    pub id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub label: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl GeoEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        GeoEntry {
            id: id.into(),
            lat: None,
            lng: None,
            label: label.into(),
            timestamp: None,
        }
    }

    #[cfg(test)]
    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    #[cfg(test)]
    pub fn on(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The entry's map position, if both coordinates are present and valid.
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.lat?, self.lng?)
    }
}
