// Adapters layer: concrete implementations for external systems (staging storage, recognition, catalog).

pub mod catalog;
pub mod recognition;
pub mod storage;

pub use catalog::HttpCatalogClient;
pub use recognition::{HttpRecognitionClient, StaticRecognitionClient};
pub use storage::LocalStorage;
