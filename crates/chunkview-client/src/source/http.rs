use super::ChunkSource;
use crate::config::ApiConfig;
use crate::utils::error::{ClientError, FetchError};
use async_trait::async_trait;
use chunkview_proto::{ChunksPayload, ChunksRequest};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// `POST {host}/api/get_chunks` over reqwest.
#[derive(Clone)]
pub struct HttpChunkSource {
    client: Client,
    endpoint: String,
}

impl HttpChunkSource {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.chunks_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn list_chunks(&self, request: &ChunksRequest) -> Result<ChunksPayload, FetchError> {
        debug!(
            "POST {} uuid={} page={} pageSize={}",
            self.endpoint, request.uuid, request.page, request.page_size
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<ChunksPayload>(&body)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}
