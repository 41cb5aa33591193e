//! Weighted-point projection of the alert collection for geospatial
//! rendering. Recomputed from the raw collection on every view.

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::alert::{Alert, LatLon};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub location: LatLon,
    /// Detection confidence, used directly as the heat weight.
    pub weight: f64,
    pub label: String,
}

/// Alerts with a parseable position and a real detector class become heat
/// points; everything else is silently skipped.
#[must_use]
pub fn heat_points(alerts: &[Alert]) -> Vec<HeatPoint> {
    alerts
        .iter()
        .filter(|a| a.alert_type.is_classified())
        .filter_map(|a| {
            a.position().map(|location| HeatPoint {
                location,
                weight: a.confidence,
                label: a.label.clone(),
            })
        })
        .collect()
}

/// The same points as a GeoJSON `FeatureCollection` (geometry order is
/// lon, lat per the GeoJSON spec) for tooling that consumes GeoJSON.
#[must_use]
pub fn to_feature_collection(points: &[HeatPoint]) -> FeatureCollection {
    let features = points
        .iter()
        .map(|p| {
            let mut properties = serde_json::Map::new();
            properties.insert("weight".to_string(), p.weight.into());
            properties.insert("label".to_string(), p.label.clone().into());
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    p.location.lon,
                    p.location.lat,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
