mod discover;
mod harvest;
mod health;
mod images;
mod index;

pub use discover::{discover, discover_by_feature};
pub use harvest::start_harvest;
pub use health::health_check;
pub use images::{get_image, redirect_to_band};
pub use index::{drop_index, index_size};
