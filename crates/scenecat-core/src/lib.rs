//! Scenecat Core - Domain models, filter predicate, and configuration
//!
//! This crate contains the scene descriptor model shared by the catalog and the
//! harvester, the filter predicate both of them apply, and the error taxonomy.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;

pub use error::{CatalogError, Result};
pub use filter::matches;
