use crate::domain::GeoEntry;
use crate::extensions::str_ext::ToTimestamp;
use serde::{Deserialize, Deserializer, Serialize};

/// A journal entry as stored by the backend. Only the fields the map needs are read.
#[derive(Debug, Deserialize, PartialEq)]
pub struct EntryDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::journal) struct EntryList {
    pub documents: Vec<EntryDocument>,
}

/// Coordinates are typed in by hand, so they arrive as numbers, numeric strings, empty strings or null.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(number)) => number.as_f64(),
        Some(serde_json::Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl From<EntryDocument> for GeoEntry {
    fn from(document: EntryDocument) -> Self {
        let mut entry = GeoEntry::new(document.id, document.title);
        entry.lat = document.latitude;
        entry.lng = document.longitude;
        entry.timestamp = document.date.as_deref().and_then(|date| date.to_timestamp());
        entry
    }
}

/// Fields to change on an entry. Unset fields are left untouched by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}
