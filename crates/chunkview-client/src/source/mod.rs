//! Chunk sources: where page requests actually go.

pub mod http;
pub mod memory;

pub use http::HttpChunkSource;
pub use memory::MemoryChunkSource;

use crate::utils::error::FetchError;
use async_trait::async_trait;
use chunkview_proto::{ChunksPayload, ChunksRequest};

/// One round trip to a chunk-listing service.
///
/// Implementations report transport problems as `Err`; an `error` string in
/// the payload is returned as-is and interpreted by the gateway.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn list_chunks(&self, request: &ChunksRequest) -> Result<ChunksPayload, FetchError>;
}
