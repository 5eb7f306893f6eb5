// App layer: wires configuration to concrete adapters.

use crate::adapters::{HttpCatalogClient, HttpRecognitionClient, LocalStorage, StaticRecognitionClient};
use crate::config::{RecognitionMode, RelayConfig};
use crate::core::pipeline::RelayPipeline;
use crate::domain::ports::RecognitionClient;
use crate::utils::error::Result;
use std::sync::Arc;

pub fn build_pipeline(config: &RelayConfig) -> Result<RelayPipeline> {
    let storage = Arc::new(LocalStorage::new(&config.staging.directory));

    let recognizer: Arc<dyn RecognitionClient> = match config.recognition.mode {
        RecognitionMode::Http => Arc::new(HttpRecognitionClient::new(
            &config.recognition.endpoint,
            config.recognition.timeout(),
        )?),
        RecognitionMode::Static => {
            tracing::warn!(
                "Recognition runs in static mode, every upload resolves to {:?}",
                config.recognition.static_name
            );
            Arc::new(StaticRecognitionClient::new(&config.recognition.static_name))
        }
    };

    let catalog = Arc::new(HttpCatalogClient::new(
        &config.catalog.endpoint,
        config.catalog.timeout(),
    )?);

    if config.catalog.has_placeholder_key() {
        tracing::warn!("catalog.api_key is not set; catalog requests will be rejected upstream");
    }

    Ok(
        RelayPipeline::new(storage, recognizer, catalog, &config.catalog.api_key)
            .with_keep_staged_files(config.staging.keep_files),
    )
}
