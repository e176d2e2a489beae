use serde::{Deserialize, Serialize};

use super::feature::Feature;

/// GeoJSON `FeatureCollection` of scene descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

/// Response to a discovery query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptors {
    /// Number of features actually resolved for the page
    pub count: usize,
    pub start_index: u64,
    pub images: FeatureCollection,
}

impl ImageDescriptors {
    pub fn new(start_index: u64, features: Vec<Feature>) -> Self {
        Self {
            count: features.len(),
            start_index,
            images: FeatureCollection::new(features),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SceneProperties;

    #[test]
    fn test_descriptor_document_shape() {
        let descriptors = ImageDescriptors::new(
            10,
            vec![Feature::new("a", None, SceneProperties::default())],
        );
        let value = serde_json::to_value(&descriptors).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["startIndex"], 10);
        assert_eq!(value["images"]["type"], "FeatureCollection");
        assert_eq!(value["images"]["features"][0]["id"], "a");
    }

    #[test]
    fn test_empty_descriptors() {
        let descriptors = ImageDescriptors::new(0, Vec::new());
        assert!(descriptors.is_empty());
        let value = serde_json::to_value(&descriptors).unwrap();
        assert_eq!(value["images"]["features"].as_array().unwrap().len(), 0);
    }
}
