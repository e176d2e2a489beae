mod request;
mod response;

pub use request::{DiscoverParams, PageParams, DEFAULT_PAGE_SIZE};
pub use response::{HarvestAccepted, HealthResponse, IndexSizeResponse};
