pub mod events;
mod geo_entry;
mod geo_point;
mod marker_group;

pub use geo_entry::GeoEntry;
pub use geo_point::GeoPoint;
pub use marker_group::MarkerGroup;
