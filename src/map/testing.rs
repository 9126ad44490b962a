use crate::domain::GeoPoint;
use crate::map::{LayerId, MapError, MapLibrary, MapSurface, MarkerSpec};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, PartialEq)]
pub enum RecordedLayer {
    Marker(MarkerSpec),
    Polyline(Vec<GeoPoint>),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    layers: BTreeMap<LayerId, RecordedLayer>,
    next_id: u64,
    destroyed: bool,
    live_instances: Option<Arc<AtomicUsize>>,
}

impl RecordingSurface {
    pub fn markers(&self) -> Vec<MarkerSpec> {
        self.layers
            .values()
            .filter_map(|layer| match layer {
                RecordedLayer::Marker(marker) => Some(marker.clone()),
                RecordedLayer::Polyline(_) => None,
            })
            .collect()
    }

    pub fn marker_ids(&self) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|(_, layer)| matches!(layer, RecordedLayer::Marker(_)))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn polylines(&self) -> Vec<Vec<GeoPoint>> {
        self.layers
            .values()
            .filter_map(|layer| match layer {
                RecordedLayer::Polyline(points) => Some(points.clone()),
                RecordedLayer::Marker(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, marker: MarkerSpec) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, RecordedLayer::Marker(marker));
        id
    }

    fn add_polyline(&mut self, points: &[GeoPoint]) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, RecordedLayer::Polyline(points.to_vec()));
        id
    }

    fn remove(&mut self, id: LayerId) -> bool {
        self.layers.remove(&id).is_some()
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    async fn commit(&mut self) -> Result<(), MapError> {
        if self.destroyed {
            return Err(MapError::Disposed);
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.layers.clear();
        if !self.destroyed {
            if let Some(live) = &self.live_instances {
                live.fetch_sub(1, Ordering::SeqCst);
            }
        }
        self.destroyed = true;
    }
}

/// Hands out recording surfaces, failing the first `failures` loads. Counts loads and live instances.
#[derive(Debug, Default)]
pub struct FakeMapLibrary {
    failures: AtomicUsize,
    loads: AtomicUsize,
    live_instances: Arc<AtomicUsize>,
}

impl FakeMapLibrary {
    pub fn failing(failures: usize) -> Self {
        FakeMapLibrary {
            failures: AtomicUsize::new(failures),
            ..Default::default()
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn live_instances(&self) -> usize {
        self.live_instances.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MapLibrary for FakeMapLibrary {
    async fn load(&self) -> Result<Box<dyn MapSurface>, MapError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(MapError::Io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "tile server unreachable")));
        }

        self.live_instances.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSurface {
            live_instances: Some(self.live_instances.clone()),
            ..Default::default()
        }))
    }
}
