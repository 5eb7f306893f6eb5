use crate::domain::model::{CatalogLookupRequest, CatalogResponse};
use crate::domain::ports::CatalogClient;
use crate::utils::error::{RelayError, Result, Upstream};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// data.go.kr 醫藥品目錄 API
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    endpoint: String,
}

impl HttpCatalogClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::ConfigError {
                message: format!("failed to build catalog HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch(&self, request: &CatalogLookupRequest) -> Result<CatalogResponse> {
        tracing::debug!(
            "Catalog request to {} for item {:?} (page {}, rows {})",
            self.endpoint,
            request.item_name,
            request.page_number,
            request.num_of_rows
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&request.query_params())
            .send()
            .await
            .map_err(|e| RelayError::unavailable(Upstream::Catalog, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::unavailable(Upstream::Catalog, e))?;

        tracing::debug!("Catalog response status: {} ({} bytes)", status, body.len());

        Ok(CatalogResponse {
            status,
            body: body.to_vec(),
        })
    }
}
