use crate::app_config::AppConfig;
use crate::domain::GeoPoint;
use crate::map::{LayerId, MapError, MapLibrary, MapSurface, MarkerSpec};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Tile-backed map that writes its marker layer as a GeoJSON feature collection.
///
/// Loading probes the tile server for the world tile; the map counts as loaded only if that tile is served.
#[derive(Debug)]
pub struct GeoJsonMapLibrary {
    client: Client,
    tile_url: String,
    output: PathBuf,
}

impl GeoJsonMapLibrary {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        GeoJsonMapLibrary {
            client,
            tile_url: config.map().tile_url().to_string(),
            output: PathBuf::from(config.map().output()),
        }
    }

    fn world_tile_url(&self) -> String {
        self.tile_url.replace("{z}", "0").replace("{x}", "0").replace("{y}", "0")
    }
}

#[async_trait]
impl MapLibrary for GeoJsonMapLibrary {
    #[instrument(skip(self), fields(tile_url = %self.tile_url))]
    async fn load(&self) -> Result<Box<dyn MapSurface>, MapError> {
        let url = self.world_tile_url();
        debug!("Probing tile server at {}...", url);
        self.client.get(&url).send().await?.error_for_status()?;
        debug!("Probing tile server at {}... OK", url);

        Ok(Box::new(GeoJsonSurface::new(self.output.clone())))
    }
}

#[derive(Debug)]
pub struct GeoJsonSurface {
    output: PathBuf,
    features: BTreeMap<LayerId, Value>,
    next_id: u64,
    destroyed: bool,
}

impl GeoJsonSurface {
    fn new(output: PathBuf) -> Self {
        GeoJsonSurface {
            output,
            features: BTreeMap::new(),
            next_id: 0,
            destroyed: false,
        }
    }

    fn next_layer_id(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id)
    }

    fn feature_collection(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.values().collect::<Vec<_>>(),
        })
    }
}

fn coordinates(point: &GeoPoint) -> Value {
    // GeoJSON positions are [longitude, latitude]
    json!([point.lng(), point.lat()])
}

fn marker_feature(id: LayerId, marker: &MarkerSpec) -> Value {
    let properties = match marker {
        MarkerSpec::Single { entry_id, number, label, .. } => json!({
            "marker_id": id.0,
            "kind": "single",
            "number": number,
            "label": label,
            "entry_ids": [entry_id],
        }),
        MarkerSpec::Cluster { count, entry_ids, .. } => json!({
            "marker_id": id.0,
            "kind": "cluster",
            "count": count,
            "entry_ids": entry_ids,
        }),
    };

    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": coordinates(&marker.position()) },
        "properties": properties,
    })
}

#[async_trait]
impl MapSurface for GeoJsonSurface {
    fn add_marker(&mut self, marker: MarkerSpec) -> LayerId {
        let id = self.next_layer_id();
        self.features.insert(id, marker_feature(id, &marker));
        id
    }

    fn add_polyline(&mut self, points: &[GeoPoint]) -> LayerId {
        let id = self.next_layer_id();
        let feature = json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": points.iter().map(coordinates).collect::<Vec<_>>() },
            "properties": { "marker_id": id.0, "kind": "path" },
        });
        self.features.insert(id, feature);
        id
    }

    fn remove(&mut self, id: LayerId) -> bool {
        self.features.remove(&id).is_some()
    }

    fn layer_count(&self) -> usize {
        self.features.len()
    }

    #[instrument(skip(self), fields(output = %self.output.display()))]
    async fn commit(&mut self) -> Result<(), MapError> {
        if self.destroyed {
            return Err(MapError::Disposed);
        }

        let content = serde_json::to_string_pretty(&self.feature_collection())?;
        fs::write(&self.output, content).await?;
        info!("💾 Wrote {} layer(s) to '{}'", self.features.len(), self.output.display());
        Ok(())
    }

    fn destroy(&mut self) {
        self.features.clear();
        self.destroyed = true;
    }
}
