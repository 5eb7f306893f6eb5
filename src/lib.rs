pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use adapters::{HttpCatalogClient, HttpRecognitionClient, LocalStorage, StaticRecognitionClient};
pub use config::{CliConfig, RelayConfig};
pub use core::parser::parse_catalog_response;
pub use core::pipeline::RelayPipeline;
pub use domain::model::{CatalogItem, CatalogLookupRequest};
pub use utils::error::{RelayError, Result};
