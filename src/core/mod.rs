pub mod parser;
pub mod pipeline;

pub use crate::domain::model::{CatalogItem, CatalogLookupRequest, CatalogResponse, StagedFile};
pub use crate::domain::ports::{CatalogClient, RecognitionClient, Storage};
pub use crate::utils::error::Result;
