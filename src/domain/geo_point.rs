use std::fmt::{Display, Formatter};

/// A validated map position, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Returns `None` unless both values are finite and within the latitude/longitude ranges.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !(lat >= -90.0 && lat <= 90.0) || !(lng >= -180.0 && lng <= 180.0) {
            return None;
        }

        Some(GeoPoint { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Planar Euclidean distance in degrees. Not geodesic.
    pub fn distance_deg(&self, other: &GeoPoint) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}
