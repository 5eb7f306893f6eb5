use crate::core::parser::parse_catalog_response;
use crate::domain::model::{CatalogItem, CatalogLookupRequest, StagedFile};
use crate::domain::ports::{CatalogClient, RecognitionClient, Storage};
use crate::utils::error::{RelayError, Result, Upstream};
use crate::utils::validation::Validate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upload -> recognition -> catalog lookup.
///
/// Holds no per-request state; one instance is shared by all handlers.
pub struct RelayPipeline {
    storage: Arc<dyn Storage>,
    recognizer: Arc<dyn RecognitionClient>,
    catalog: Arc<dyn CatalogClient>,
    api_key: String,
    keep_staged_files: bool,
}

impl RelayPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        recognizer: Arc<dyn RecognitionClient>,
        catalog: Arc<dyn CatalogClient>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            recognizer,
            catalog,
            api_key: api_key.into(),
            keep_staged_files: true,
        }
    }

    pub fn with_keep_staged_files(mut self, keep: bool) -> Self {
        self.keep_staged_files = keep;
        self
    }

    /// Catalog call followed by parsing. A non-200 reply is never parsed.
    pub async fn lookup(&self, request: &CatalogLookupRequest) -> Result<CatalogItem> {
        request.validate()?;

        let response = self.catalog.fetch(request).await?;
        if response.status != 200 {
            warn!(
                status = response.status,
                "Catalog request failed for {:?}", request.item_name
            );
            return Err(RelayError::UpstreamBadStatus {
                service: Upstream::Catalog,
                status: response.status,
                body: response.text(),
            });
        }

        parse_catalog_response(&response.body)
    }

    /// 處理上傳的藥品照片
    pub async fn identify_upload(&self, file_name: &str, data: &[u8]) -> Result<CatalogItem> {
        let staged = self.storage.stage(file_name, data).await?;
        debug!("Saved upload to {}", staged.path.display());

        let result = self.identify_staged(&staged).await;

        if !self.keep_staged_files {
            if let Err(e) = self.storage.discard(&staged).await {
                warn!("Failed to remove staged file {}: {}", staged.path.display(), e);
            }
        }

        result
    }

    async fn identify_staged(&self, staged: &StagedFile) -> Result<CatalogItem> {
        let image = self.storage.read(staged).await?;
        let medicine_name = self
            .recognizer
            .identify(&staged.original_name, image)
            .await?;
        info!("Identified medicine: {}", medicine_name);

        let request = CatalogLookupRequest::new(self.api_key.clone(), medicine_name);
        self.lookup(&request).await
    }
}
