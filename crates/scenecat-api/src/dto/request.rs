use scenecat_core::models::{Bands, BoundingBox, Feature, SceneProperties};
use serde::Deserialize;

use crate::error::ApiError;

/// Results per page when a request leaves `end` unset
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Page window of a discovery request, both ends inclusive
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl PageParams {
    pub fn range(&self) -> (u64, u64) {
        page_range(self.start, self.end)
    }
}

/// Query string of `GET /discover`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverParams {
    pub cloud_cover: Option<f64>,
    pub bit_depth: Option<u32>,
    pub relevance_score: Option<f64>,
    pub acquired_date: Option<String>,
    /// Comma-separated band names
    pub bands: Option<String>,
    /// `minx,miny,maxx,maxy`
    pub bbox: Option<String>,
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl DiscoverParams {
    pub fn range(&self) -> (u64, u64) {
        page_range(self.start, self.end)
    }

    /// Constraint described by the query string
    pub fn constraint(&self) -> Result<Feature, ApiError> {
        let bands: Option<Bands> = self.bands.as_deref().map(|raw| {
            raw.split(',').map(str::trim).filter(|b| !b.is_empty()).collect()
        });

        let mut constraint = Feature::template(SceneProperties {
            cloud_cover: self.cloud_cover,
            bit_depth: self.bit_depth,
            relevance_score: self.relevance_score,
            acquired_date: self.acquired_date.clone().filter(|d| !d.is_empty()),
            bands,
            ..Default::default()
        });

        if let Some(raw) = self.bbox.as_deref().filter(|b| !b.is_empty()) {
            constraint = constraint.with_bbox(parse_bbox(raw)?);
        }

        Ok(constraint)
    }
}

fn page_range(start: Option<u64>, end: Option<u64>) -> (u64, u64) {
    let start = start.unwrap_or(0);
    (start, end.unwrap_or(start.saturating_add(DEFAULT_PAGE_SIZE - 1)))
}

fn parse_bbox(raw: &str) -> Result<BoundingBox, ApiError> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::bad_request("Invalid bbox").with_details(e.to_string()))?;

    BoundingBox::try_from(values)
        .map_err(|reason| ApiError::bad_request("Invalid bbox").with_details(reason))
}
