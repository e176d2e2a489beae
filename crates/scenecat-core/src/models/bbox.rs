//! Axis-aligned bounding boxes in GeoJSON `bbox` array form.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::intersects::Intersects;
use geo::{coord, Rect};
use serde::{Deserialize, Deserializer, Serialize};

/// Bounding box `[min_x, min_y, max_x, max_y]`
///
/// Three-dimensional GeoJSON boxes (six values) are accepted on input; the
/// elevation range is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Compute the bounding box of a GeoJSON geometry
    ///
    /// Returns `None` for empty or unconvertible geometries.
    pub fn from_geometry(geometry: &geojson::Geometry) -> Option<Self> {
        let geom: geo::Geometry<f64> = geometry.value.clone().try_into().ok()?;
        geom.bounding_rect().map(Self::from)
    }

    /// Check whether two boxes share at least one point
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.to_rect().intersects(&other.to_rect())
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(coord! { x: self.min_x, y: self.min_y }, coord! { x: self.max_x, y: self.max_y })
    }

    fn is_finite(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y].iter().all(|v| v.is_finite())
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl TryFrom<Vec<f64>> for BoundingBox {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let bbox = match values.as_slice() {
            [min_x, min_y, max_x, max_y] => Self::new(*min_x, *min_y, *max_x, *max_y),
            [min_x, min_y, _, max_x, max_y, _] => Self::new(*min_x, *min_y, *max_x, *max_y),
            other => {
                return Err(format!("bbox must have 4 or 6 values, got {}", other.len()));
            }
        };
        if !bbox.is_finite() {
            return Err("bbox values must be finite".to_string());
        }
        Ok(bbox)
    }
}

impl From<BoundingBox> for Vec<f64> {
    fn from(bbox: BoundingBox) -> Self {
        vec![bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y]
    }
}

/// Deserialize an optional bbox, treating an empty array as absent
pub(crate) fn deserialize_optional_bbox<'de, D>(
    deserializer: D,
) -> Result<Option<BoundingBox>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<f64>> = Option::deserialize(deserializer)?;
    match values {
        None => Ok(None),
        Some(values) if values.is_empty() => Ok(None),
        Some(values) => BoundingBox::try_from(values).map(Some).map_err(serde::de::Error::custom),
    }
}
