use scenecat_catalog::Catalog;
use scenecat_harvest::Harvester;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub harvester: Harvester,
}

impl AppState {
    pub fn new(catalog: Catalog, harvester: Harvester) -> Self {
        Self { catalog, harvester }
    }
}
