pub mod bbox;
pub mod descriptors;
pub mod feature;
pub mod harvest;

pub use bbox::BoundingBox;
pub use descriptors::{FeatureCollection, ImageDescriptors};
pub use feature::{Bands, Feature, FeatureKind, SceneProperties};
pub use harvest::HarvestOptions;
