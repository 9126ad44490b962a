use crate::clustering::DEFAULT_PROXIMITY_THRESHOLD_DEG;
use config::Config;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    journal: Journal,
    map: Map,
    search: Search,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("JOURNAL_MAP").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppConfigError> {
        let threshold = self.map.proximity_threshold_deg;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(AppConfigError::InvalidThreshold(threshold));
        }

        Ok(())
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn search(&self) -> &Search {
        &self.search
    }
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid proximity threshold {0}, must be a positive number of degrees")]
    InvalidThreshold(f64),
}

#[derive(Debug, Deserialize)]
pub struct Core {
    event_buffer_size: usize,
}

impl Core {
    pub fn event_buffer_size(&self) -> usize {
        self.event_buffer_size
    }
}

#[derive(Debug, Deserialize)]
pub struct Journal {
    url: String,
    api_key: String,
}

impl Journal {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn default_threshold() -> f64 {
    DEFAULT_PROXIMITY_THRESHOLD_DEG
}

#[derive(Debug, Deserialize)]
pub struct Map {
    tile_url: String,
    output: String,
    #[serde(default = "default_threshold")]
    proximity_threshold_deg: f64,
    #[serde(with = "humantime_serde")]
    hover_grace: Duration,
}

impl Map {
    pub fn tile_url(&self) -> &str {
        &self.tile_url
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn proximity_threshold_deg(&self) -> f64 {
        self.proximity_threshold_deg
    }

    pub fn hover_grace(&self) -> Duration {
        self.hover_grace
    }
}

#[derive(Debug, Deserialize)]
pub struct Search {
    #[serde(with = "humantime_serde")]
    debounce: Duration,
}

impl Search {
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core { event_buffer_size: 16 },
                journal: Journal {
                    url: "https://journal.url".to_string(),
                    api_key: "key".to_string(),
                },
                map: Map {
                    tile_url: "https://tiles.url/{z}/{x}/{y}.png".to_string(),
                    output: "map_layer.geojson".to_string(),
                    proximity_threshold_deg: DEFAULT_PROXIMITY_THRESHOLD_DEG,
                    hover_grace: Duration::from_millis(250),
                },
                search: Search {
                    debounce: Duration::from_millis(300),
                },
            },
        }
    }

    pub fn journal_url(mut self, url: String) -> Self {
        self.config.journal.url = url;
        self
    }

    pub fn tile_url(mut self, url: String) -> Self {
        self.config.map.tile_url = url;
        self
    }

    pub fn proximity_threshold_deg(mut self, threshold: f64) -> Self {
        self.config.map.proximity_threshold_deg = threshold;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
