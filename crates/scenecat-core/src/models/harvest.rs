use serde::{Deserialize, Serialize};

use super::feature::Feature;

/// Parameters for one harvest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestOptions {
    /// Feed credential; falls back to `PL_API_KEY` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planet_key: Option<String>,

    /// Pre-storage constraint, same shape as a discovery query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Feature>,

    /// Primary index score assigned to every stored feature
    #[serde(default)]
    pub reharvest: f64,

    /// Maximum number of features to store; 0 means no cap
    #[serde(default)]
    pub cap: usize,

    /// Emit a notification per stored feature
    #[serde(default)]
    pub event: bool,
}

impl HarvestOptions {
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_filter(mut self, filter: Feature) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.reharvest = score;
        self
    }

    pub fn with_events(mut self, event: bool) -> Self {
        self.event = event;
        self
    }

    /// Whether `count` stored items reach the cap
    pub fn cap_reached(&self, count: usize) -> bool {
        self.cap > 0 && count >= self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let options: HarvestOptions = serde_json::from_str("{}").unwrap();
        assert!(options.planet_key.is_none());
        assert!(options.filter.is_none());
        assert_eq!(options.cap, 0);
        assert!(!options.event);
        assert!(!options.cap_reached(1_000_000));
    }

    #[test]
    fn test_cap_reached() {
        let options = HarvestOptions::default().with_cap(5);
        assert!(!options.cap_reached(4));
        assert!(options.cap_reached(5));
    }
}
