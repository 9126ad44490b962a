use crate::clustering::Grouping;
use crate::domain::GeoPoint;
use crate::map::{LayerId, MapError, MapLibrary, MapSurface, MarkerLayer, MarkerTarget, RenderSummary};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum MapState {
    #[default]
    Idle,
    Ready,
    Failed(String),
    Disposed,
}

impl Display for MapState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MapState::Idle => write!(f, "idle"),
            MapState::Ready => write!(f, "ready"),
            MapState::Failed(reason) => write!(f, "failed ({})", reason),
            MapState::Disposed => write!(f, "disposed"),
        }
    }
}

/// Owns the one map instance of a view, from `init` until `dispose`.
#[derive(Debug)]
pub struct MapHandle {
    library: Arc<dyn MapLibrary>,
    surface: Option<Box<dyn MapSurface>>,
    layer: MarkerLayer,
    state: MapState,
}

impl MapHandle {
    pub fn new(library: Arc<dyn MapLibrary>) -> Self {
        MapHandle {
            library,
            surface: None,
            layer: MarkerLayer::new(),
            state: MapState::Idle,
        }
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == MapState::Ready
    }

    /// Loads the map library. A ready map is left alone so a second call never creates a second instance.
    #[instrument(skip_all)]
    pub async fn init(&mut self) -> Result<(), MapError> {
        match self.state {
            MapState::Ready => {
                debug!("🗺️ Map already initialized, skipping");
                return Ok(());
            }
            MapState::Disposed => return Err(MapError::Disposed),
            MapState::Idle | MapState::Failed(_) => {}
        }

        info!("🗺️ Loading map library...");
        match self.library.load().await {
            Ok(surface) => {
                self.surface = Some(surface);
                self.state = MapState::Ready;
                info!("🗺️ Loading map library... OK");
                Ok(())
            }
            Err(e) => {
                self.surface = None;
                self.state = MapState::Failed(e.to_string());
                error!("🗺️ Loading map library... failed, {}", e);
                Err(e)
            }
        }
    }

    /// Manual retry after a failed load.
    pub async fn retry(&mut self) -> Result<(), MapError> {
        match self.state {
            MapState::Failed(_) => self.init().await,
            MapState::Ready => {
                debug!("🗺️ Map is ready, nothing to retry");
                Ok(())
            }
            MapState::Idle => Err(MapError::NotInitialized),
            MapState::Disposed => Err(MapError::Disposed),
        }
    }

    /// Clears the map and draws `grouping` and `path` from scratch.
    pub async fn render(&mut self, grouping: &Grouping, path: &[GeoPoint]) -> Result<RenderSummary, MapError> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(match self.state {
                MapState::Disposed => MapError::Disposed,
                _ => MapError::NotInitialized,
            });
        };

        let summary = self.layer.rebuild(surface.as_mut(), grouping, path);
        surface.commit().await?;
        Ok(summary)
    }

    pub fn target(&self, id: LayerId) -> Option<&MarkerTarget> {
        self.layer.target(id)
    }

    pub fn layer_count(&self) -> usize {
        self.surface.as_ref().map_or(0, |surface| surface.layer_count())
    }

    /// Releases every marker, the path and the map instance.
    pub fn dispose(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            let removed = self.layer.clear(surface.as_mut());
            surface.destroy();
            info!(removed, "🗺️ Disposed map");
        }

        self.layer.forget();
        self.state = MapState::Disposed;
    }
}

impl Drop for MapHandle {
    fn drop(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            warn!("⚠️ Map dropped without being disposed");
            surface.destroy();
        }
    }
}
