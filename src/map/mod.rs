mod geojson;
mod handle;
mod library;
mod marker_layer;
#[cfg(test)]
pub mod testing;

pub use geojson::GeoJsonMapLibrary;
pub use handle::{MapHandle, MapState};
pub use library::{LayerId, MapError, MapLibrary, MapSurface, MarkerSpec};
pub use marker_layer::{MarkerLayer, MarkerTarget, RenderSummary};
