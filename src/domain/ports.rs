use crate::domain::model::{CatalogLookupRequest, CatalogResponse, StagedFile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Local storage for uploads before they are forwarded.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedFile>;
    async fn read(&self, staged: &StagedFile) -> Result<Vec<u8>>;
    async fn discard(&self, staged: &StagedFile) -> Result<()>;
}

/// Maps an image to a medicine name.
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    async fn identify(&self, file_name: &str, image: Vec<u8>) -> Result<String>;
}

/// Public medicine catalog. Returns the raw reply; status is checked by the caller.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch(&self, request: &CatalogLookupRequest) -> Result<CatalogResponse>;
}
