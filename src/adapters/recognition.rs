use crate::domain::ports::RecognitionClient;
use crate::utils::error::{RelayError, Result, Upstream};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RecognitionReply {
    medicine_name: Option<String>,
}

/// Posts the image as multipart field `file` and reads `medicine_name` from the JSON reply.
#[derive(Debug, Clone)]
pub struct HttpRecognitionClient {
    client: Client,
    endpoint: String,
}

impl HttpRecognitionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::ConfigError {
                message: format!("failed to build recognition HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RecognitionClient for HttpRecognitionClient {
    async fn identify(&self, file_name: &str, image: Vec<u8>) -> Result<String> {
        tracing::debug!(
            "Sending {} ({} bytes) to recognition service: {}",
            file_name,
            image.len(),
            self.endpoint
        );

        let part = Part::bytes(image).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::unavailable(Upstream::Recognition, e))?;

        let status = response.status();
        tracing::debug!("Recognition response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::unavailable(Upstream::Recognition, e))?;

        if !status.is_success() {
            return Err(RelayError::UpstreamBadStatus {
                service: Upstream::Recognition,
                status: status.as_u16(),
                body,
            });
        }

        let reply: RecognitionReply =
            serde_json::from_str(&body).map_err(|e| RelayError::MalformedResponse {
                service: Upstream::Recognition,
                message: format!("reply is not valid JSON: {}", e),
            })?;

        match reply.medicine_name {
            Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
            _ => Err(RelayError::MalformedResponse {
                service: Upstream::Recognition,
                message: "reply has no medicine_name".to_string(),
            }),
        }
    }
}

/// Returns a fixed name without contacting any service.
#[derive(Debug, Clone)]
pub struct StaticRecognitionClient {
    name: String,
}

impl StaticRecognitionClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl RecognitionClient for StaticRecognitionClient {
    async fn identify(&self, file_name: &str, image: Vec<u8>) -> Result<String> {
        tracing::debug!(
            "Static recognition for {} ({} bytes): {}",
            file_name,
            image.len(),
            self.name
        );
        Ok(self.name.clone())
    }
}
