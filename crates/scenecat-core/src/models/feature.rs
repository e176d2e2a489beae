use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bbox::{deserialize_optional_bbox, BoundingBox};

/// GeoJSON object type of a [`Feature`]
///
/// Optional on input, so a bare `{"properties": {..}}` constraint is
/// accepted; any value other than `"Feature"` is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    #[default]
    Feature,
}

/// A scene descriptor in GeoJSON `Feature` form
///
/// The same shape doubles as a query descriptor: populated properties and the
/// bounding box act as constraints, absent ones impose none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    kind: FeatureKind,

    /// Catalog identity, e.g. `landsat:LC80440342016165LGN00`
    #[serde(default)]
    pub id: String,

    pub geometry: Option<geojson::Geometry>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_bbox"
    )]
    pub bbox: Option<BoundingBox>,

    #[serde(default)]
    pub properties: SceneProperties,
}

impl Feature {
    pub fn new(
        id: impl Into<String>,
        geometry: Option<geojson::Geometry>,
        properties: SceneProperties,
    ) -> Self {
        Self { kind: FeatureKind::Feature, id: id.into(), geometry, bbox: None, properties }
    }

    /// Create an identity-less feature used only as a filter template
    pub fn template(properties: SceneProperties) -> Self {
        Self::new("", None, properties)
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Fill in the bounding box from the geometry when none is present
    pub fn force_bbox(&mut self) -> Option<BoundingBox> {
        if self.bbox.is_none() {
            self.bbox = self.geometry.as_ref().and_then(BoundingBox::from_geometry);
        }
        self.bbox
    }

    pub fn cloud_cover(&self) -> Option<f64> {
        self.properties.cloud_cover.filter(|v| !v.is_nan())
    }

    pub fn bit_depth(&self) -> Option<u32> {
        self.properties.bit_depth
    }

    pub fn relevance_score(&self) -> Option<f64> {
        self.properties.relevance_score.filter(|v| !v.is_nan())
    }

    pub fn acquired_date(&self) -> Option<&str> {
        self.properties.acquired_date.as_deref().filter(|s| !s.is_empty())
    }

    pub fn bands(&self) -> Option<&Bands> {
        self.properties.bands.as_ref()
    }
}

/// Typed scene properties
///
/// Recognised keys are explicit optional fields; anything else a provider
/// supplies is kept in `extra` and round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneProperties {
    /// Estimated cloud cover in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u32>,

    /// Computed suitability score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,

    /// RFC 3339 acquisition timestamp, kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Bands>,

    /// Ground sample distance in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "thumb_large", skip_serializing_if = "Option::is_none")]
    pub thumb_large: Option<String>,

    #[serde(rename = "thumb_small", skip_serializing_if = "Option::is_none")]
    pub thumb_small: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Spectral bands of a scene
///
/// Stored scenes carry a band-name to URL mapping; query descriptors list the
/// band names they require.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bands {
    Urls(BTreeMap<String, String>),
    Names(Vec<String>),
}

impl Bands {
    /// Band names in a stable order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Bands::Urls(urls) => urls.keys().map(String::as_str).collect(),
            Bands::Names(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, band: &str) -> bool {
        match self {
            Bands::Urls(urls) => urls.contains_key(band),
            Bands::Names(names) => names.iter().any(|n| n == band),
        }
    }

    /// URL of a named band, if this is a URL mapping
    pub fn url(&self, band: &str) -> Option<&str> {
        match self {
            Bands::Urls(urls) => urls.get(band).map(String::as_str),
            Bands::Names(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Bands::Urls(urls) => urls.is_empty(),
            Bands::Names(names) => names.is_empty(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Bands {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Bands::Names(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_geojson_shape() {
        let feature = Feature::new(
            "landsat:LC8",
            Some(geojson::Geometry::new(geojson::Value::Point(vec![1.0, 2.0]))),
            SceneProperties {
                cloud_cover: Some(12.5),
                acquired_date: Some("2016-06-13T18:49:21Z".to_string()),
                ..Default::default()
            },
        )
        .with_bbox(BoundingBox::new(1.0, 2.0, 1.0, 2.0));

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["id"], "landsat:LC8");
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["bbox"], json!([1.0, 2.0, 1.0, 2.0]));
        assert_eq!(value["properties"]["cloudCover"], 12.5);
        assert!(value["properties"].get("bitDepth").is_none());

        let back: Feature = serde_json::from_value(value).unwrap();
        assert_eq!(back, feature);
    }

    #[test]
    fn test_unknown_properties_are_kept() {
        let value = json!({
            "type": "Feature",
            "id": "x",
            "geometry": null,
            "properties": {"cloudCover": 3, "platform": "sat-1", "orbit": {"number": 7}}
        });
        let feature: Feature = serde_json::from_value(value).unwrap();
        assert_eq!(feature.cloud_cover(), Some(3.0));
        assert_eq!(feature.properties.extra["platform"], "sat-1");
        assert_eq!(feature.properties.extra["orbit"]["number"], 7);
    }

    #[test]
    fn test_type_member_is_optional_but_checked() {
        let bare: Feature =
            serde_json::from_value(json!({"properties": {"cloudCover": 20}})).unwrap();
        assert_eq!(bare.cloud_cover(), Some(20.0));
        assert_eq!(bare, Feature::template(SceneProperties { cloud_cover: Some(20.0), ..Default::default() }));
        assert_eq!(serde_json::to_value(&bare).unwrap()["type"], "Feature");

        let wrong = json!({"type": "FeatureCollection", "properties": {}});
        assert!(serde_json::from_value::<Feature>(wrong).is_err());
    }

    #[test]
    fn test_empty_bbox_is_absent() {
        let value = json!({"type": "Feature", "geometry": null, "bbox": [], "properties": {}});
        let feature: Feature = serde_json::from_value(value).unwrap();
        assert!(feature.bbox.is_none());
        assert!(feature.id.is_empty());
    }

    #[test]
    fn test_bands_accept_map_or_list() {
        let stored: Bands = serde_json::from_value(json!({"red": "r.tif", "nir": "n.tif"})).unwrap();
        assert!(stored.contains("red"));
        assert_eq!(stored.url("nir"), Some("n.tif"));
        assert_eq!(stored.names(), vec!["nir", "red"]);

        let wanted: Bands = serde_json::from_value(json!(["red", "swir1"])).unwrap();
        assert!(wanted.contains("swir1"));
        assert_eq!(wanted.url("red"), None);
    }

    #[test]
    fn test_nan_reads_as_absent() {
        let feature = Feature::template(SceneProperties {
            cloud_cover: Some(f64::NAN),
            relevance_score: Some(f64::NAN),
            acquired_date: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(feature.cloud_cover(), None);
        assert_eq!(feature.relevance_score(), None);
        assert_eq!(feature.acquired_date(), None);
    }

    #[test]
    fn test_force_bbox_from_geometry() {
        let mut feature = Feature::new(
            "f",
            Some(geojson::Geometry::new(geojson::Value::LineString(vec![
                vec![0.0, 0.0],
                vec![4.0, 3.0],
            ]))),
            SceneProperties::default(),
        );
        assert_eq!(feature.force_bbox(), Some(BoundingBox::new(0.0, 0.0, 4.0, 3.0)));
    }
}
