use crate::domain::GeoPoint;
use async_trait::async_trait;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

/// Identifies a marker or overlay drawn on a map surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl Display for LayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MarkerSpec {
    Single {
        entry_id: String,
        number: usize,
        label: String,
        position: GeoPoint,
    },
    Cluster {
        count: usize,
        position: GeoPoint,
        entry_ids: Vec<String>,
    },
}

impl MarkerSpec {
    pub fn position(&self) -> GeoPoint {
        match self {
            MarkerSpec::Single { position, .. } | MarkerSpec::Cluster { position, .. } => *position,
        }
    }
}

/// A third-party map library that must be loaded before anything can be drawn.
#[async_trait]
pub trait MapLibrary: Debug + Send + Sync {
    /// Creates a new map instance. Failing loads must not leave anything behind.
    async fn load(&self) -> Result<Box<dyn MapSurface>, MapError>;
}

/// One live map instance.
#[async_trait]
pub trait MapSurface: Debug + Send + Sync {
    fn add_marker(&mut self, marker: MarkerSpec) -> LayerId;

    fn add_polyline(&mut self, points: &[GeoPoint]) -> LayerId;

    /// Returns false if nothing was drawn under `id`.
    fn remove(&mut self, id: LayerId) -> bool;

    fn layer_count(&self) -> usize;

    /// Pushes the drawn layers out to the display.
    async fn commit(&mut self) -> Result<(), MapError>;

    /// Releases the instance. The surface is unusable afterwards.
    fn destroy(&mut self);
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("map library failed to load: {0}")]
    LoadFailed(#[from] reqwest::Error),
    #[error("map is not initialized")]
    NotInitialized,
    #[error("map has been disposed")]
    Disposed,
    #[error("unable to write the map layer: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to serialize the map layer: {0}")]
    Serialization(#[from] serde_json::Error),
}
