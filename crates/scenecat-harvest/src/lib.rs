//! Scenecat Harvest - Feed ingestion
//!
//! Pages through an external scene feed, turns raw provider records into
//! catalog features, and writes the ones passing the run's filter.

pub mod events;
pub mod feed;
pub mod harvester;
pub mod landsat;

pub use events::{EventSink, HttpEventSink, NoopEventSink};
pub use feed::{FeedPage, PlanetFeed, SceneFeed};
pub use harvester::{HarvestReport, Harvester, StopReason};
