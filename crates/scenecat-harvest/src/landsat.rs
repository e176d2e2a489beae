//! Landsat 8 records of the Planet scene feed

use scenecat_core::error::{CatalogError, Result};
use scenecat_core::models::{Bands, BoundingBox, Feature, SceneProperties};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Public bucket holding the Landsat 8 archive
pub const LANDSAT_BUCKET: &str = "https://landsat-pds.s3.amazonaws.com/";

/// Prefix of catalog identities for Landsat scenes
pub const IDENTITY_PREFIX: &str = "landsat:";

/// Band names in band-number order, B1 through B11
pub const BAND_NAMES: [&str; 11] = [
    "coastal",
    "blue",
    "green",
    "red",
    "nir",
    "swir1",
    "swir2",
    "panchromatic",
    "cirrus",
    "tirs1",
    "tirs2",
];

#[derive(Debug, Deserialize)]
struct RawScene {
    id: String,
    geometry: Option<geojson::Geometry>,
    bbox: Option<Vec<f64>>,
    properties: RawProperties,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    cloud_cover: RawCloudCover,
    image_statistics: RawImageStatistics,
    acquired: String,
}

#[derive(Debug, Deserialize)]
struct RawCloudCover {
    estimated: f64,
}

#[derive(Debug, Deserialize)]
struct RawImageStatistics {
    gsd: f64,
}

/// Folder of a scene in the public archive
///
/// Scene ids encode WRS path and row at offsets 3..6 and 6..9.
pub fn scene_folder(id: &str) -> Result<String> {
    let (path, row) = match (id.get(3..6), id.get(6..9)) {
        (Some(path), Some(row)) => (path, row),
        _ => {
            return Err(CatalogError::InvalidRecord {
                id: id.to_string(),
                reason: "scene id too short to carry path and row".to_string(),
            })
        }
    };

    let mut folder = LANDSAT_BUCKET.to_string();
    if id.starts_with("LC8") {
        folder.push_str("L8/");
    }
    folder.push_str(&format!("{}/{}/{}/", path, row, id));
    Ok(folder)
}

/// Turn a raw feed record into a catalog feature
pub fn transform(record: serde_json::Value) -> Result<Feature> {
    let id = record.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let raw: RawScene = serde_json::from_value(record)
        .map_err(|e| CatalogError::InvalidRecord { id: id.clone(), reason: e.to_string() })?;

    let folder = scene_folder(&raw.id)?;
    let bands: BTreeMap<String, String> = BAND_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), format!("{}{}_B{}.TIF", folder, raw.id, i + 1)))
        .collect();

    let properties = SceneProperties {
        cloud_cover: Some(raw.properties.cloud_cover.estimated),
        acquired_date: Some(raw.properties.acquired),
        resolution: Some(raw.properties.image_statistics.gsd),
        file_format: Some("geotiff".to_string()),
        sensor_name: Some("Landsat8".to_string()),
        path: Some(format!("{}index.html", folder)),
        thumb_large: Some(format!("{}{}_thumb_large.jpg", folder, raw.id)),
        thumb_small: Some(format!("{}{}_thumb_small.jpg", folder, raw.id)),
        bands: Some(Bands::Urls(bands)),
        ..Default::default()
    };

    let mut feature = Feature::new(format!("{}{}", IDENTITY_PREFIX, raw.id), raw.geometry, properties);
    if let Some(bbox) = raw.bbox.filter(|b| !b.is_empty()) {
        let bbox = BoundingBox::try_from(bbox)
            .map_err(|reason| CatalogError::InvalidRecord { id: raw.id.clone(), reason })?;
        feature = feature.with_bbox(bbox);
    }
    feature.force_bbox();

    Ok(feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> serde_json::Value {
        json!({
            "type": "Feature",
            "id": "LC81230452016001LGN00",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[100.0, 10.0], [102.0, 10.0], [102.0, 12.0], [100.0, 12.0], [100.0, 10.0]]]
            },
            "properties": {
                "acquired": "2016-01-01T03:12:44Z",
                "cloud_cover": {"estimated": 12.5},
                "image_statistics": {"gsd": 30.0}
            }
        })
    }

    #[test]
    fn test_transform_landsat_scene() {
        let feature = transform(record()).unwrap();
        let folder = "https://landsat-pds.s3.amazonaws.com/L8/123/045/LC81230452016001LGN00/";

        assert_eq!(feature.id, "landsat:LC81230452016001LGN00");
        assert_eq!(feature.cloud_cover(), Some(12.5));
        assert_eq!(feature.acquired_date(), Some("2016-01-01T03:12:44Z"));
        assert_eq!(feature.properties.resolution, Some(30.0));
        assert_eq!(feature.properties.sensor_name.as_deref(), Some("Landsat8"));
        assert_eq!(feature.properties.file_format.as_deref(), Some("geotiff"));
        assert_eq!(feature.properties.path, Some(format!("{}index.html", folder)));
        assert_eq!(
            feature.properties.thumb_small,
            Some(format!("{}LC81230452016001LGN00_thumb_small.jpg", folder))
        );

        let bands = feature.bands().unwrap();
        assert_eq!(bands.names().len(), 11);
        assert_eq!(bands.url("red"), Some(format!("{}LC81230452016001LGN00_B4.TIF", folder).as_str()));
        assert_eq!(bands.url("tirs2"), Some(format!("{}LC81230452016001LGN00_B11.TIF", folder).as_str()));

        assert_eq!(feature.bbox, Some(BoundingBox::new(100.0, 10.0, 102.0, 12.0)));
    }

    #[test]
    fn test_record_bbox_takes_precedence() {
        let mut raw = record();
        raw["bbox"] = json!([0.0, 0.0, 1.0, 1.0]);
        let feature = transform(raw).unwrap();
        assert_eq!(feature.bbox, Some(BoundingBox::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_non_l8_folder() {
        assert_eq!(
            scene_folder("LE71230452016001EDC00").unwrap(),
            "https://landsat-pds.s3.amazonaws.com/123/045/LE71230452016001EDC00/"
        );
    }

    #[test]
    fn test_short_id_is_invalid() {
        let mut raw = record();
        raw["id"] = json!("LC8");
        match transform(raw) {
            Err(CatalogError::InvalidRecord { id, .. }) => assert_eq!(id, "LC8"),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_cloud_cover_is_invalid() {
        let mut raw = record();
        raw["properties"].as_object_mut().unwrap().remove("cloud_cover");
        let err = transform(raw).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { ref id, .. } if id == "LC81230452016001LGN00"));
    }
}
