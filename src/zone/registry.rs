use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::Zone;
use super::polygon::Polygon;
use crate::color;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct ZoneSpec {
    points: Vec<[i32; 2]>,
}

/// Immutable set of zones for one video resolution.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    resolution: (u32, u32),
}

impl ZoneRegistry {
    /// Load zones from a JSON file mapping zone name to `{ "points": [[x, y], ...] }`.
    pub fn load(path: impl AsRef<Path>, resolution: (u32, u32)) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&data, resolution)?;
        info!(path = %path.display(), zones = registry.len(), "zones loaded");
        Ok(registry)
    }

    /// Parse zones from a JSON document. Zone ids follow document order, starting at 1.
    pub fn from_json_str(json: &str, resolution: (u32, u32)) -> Result<Self> {
        let entries: Map<String, Value> = serde_json::from_str(json)?;
        if entries.is_empty() {
            return Err(Error::NoZones);
        }

        let mut zones = Vec::with_capacity(entries.len());
        for (index, (name, value)) in entries.into_iter().enumerate() {
            let spec: ZoneSpec =
                serde_json::from_value(value).map_err(|e| Error::MalformedZone {
                    zone: name.clone(),
                    reason: e.to_string(),
                })?;

            let points = spec.points.len();
            let polygon = Polygon::new(spec.points)
                .ok_or_else(|| Error::DegeneratePolygon {
                    zone: name.clone(),
                    points,
                })?;

            let (w, h) = (resolution.0 as i32, resolution.1 as i32);
            if polygon
                .points()
                .iter()
                .any(|&[x, y]| x < 0 || y < 0 || x > w || y > h)
            {
                warn!(zone = %name, width = w, height = h, "zone extends outside the frame");
            }

            let id = index + 1;
            zones.push(Zone {
                id,
                name,
                polygon,
                color: color::by_index(id),
            });
        }

        Ok(Self { zones, resolution })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Zone by 1-based id.
    pub fn get(&self, id: usize) -> Option<&Zone> {
        id.checked_sub(1).and_then(|i| self.zones.get(i))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Frame (width, height) the zones were defined for.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLUTION: (u32, u32) = (1920, 1080);

    #[test]
    fn test_ids_follow_document_order() {
        let json = r#"{
            "queue": {"points": [[0, 0], [0, 10], [10, 10], [10, 0]]},
            "checkout": {"points": [[20, 20], [20, 30], [30, 30]]}
        }"#;
        let registry = ZoneRegistry::from_json_str(json, RESOLUTION).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().name, "queue");
        assert_eq!(registry.get(2).unwrap().name, "checkout");
        assert!(registry.get(0).is_none());
        assert!(registry.get(3).is_none());
        assert_eq!(registry.get(1).unwrap().color, color::by_index(1));
    }

    #[test]
    fn test_too_few_points() {
        let json = r#"{"line": {"points": [[0, 0], [10, 10]]}}"#;
        let err = ZoneRegistry::from_json_str(json, RESOLUTION).unwrap_err();
        assert!(matches!(err, Error::DegeneratePolygon { ref zone, points: 2 } if zone == "line"));
    }

    #[test]
    fn test_non_numeric_coordinates() {
        let json = r#"{"bad": {"points": [[0, 0], ["a", 10], [10, 10]]}}"#;
        let err = ZoneRegistry::from_json_str(json, RESOLUTION).unwrap_err();
        assert!(matches!(err, Error::MalformedZone { ref zone, .. } if zone == "bad"));
    }

    #[test]
    fn test_missing_points_key() {
        let json = r#"{"bad": {"vertices": [[0, 0], [0, 10], [10, 10]]}}"#;
        assert!(matches!(
            ZoneRegistry::from_json_str(json, RESOLUTION),
            Err(Error::MalformedZone { .. })
        ));
    }

    #[test]
    fn test_empty_and_invalid_documents() {
        assert!(matches!(
            ZoneRegistry::from_json_str("{}", RESOLUTION),
            Err(Error::NoZones)
        ));
        assert!(matches!(
            ZoneRegistry::from_json_str("not json", RESOLUTION),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ZoneRegistry::load("/nonexistent/zones.json", RESOLUTION).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
