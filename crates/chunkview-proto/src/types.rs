use crate::{DocumentId, ProtoError};
use serde::{Deserialize, Serialize};

/// Body of a chunk-listing request.
///
/// Serialized exactly as the service expects it: `{ "uuid", "page", "pageSize" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunksRequest {
    pub uuid: String,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl ChunksRequest {
    /// Build a request, checking `page >= 1` and `page_size >= 1`.
    pub fn new(document: &DocumentId, page: u32, page_size: u32) -> Result<Self, ProtoError> {
        if page == 0 {
            return Err(ProtoError::InvalidPage(page));
        }
        if page_size == 0 {
            return Err(ProtoError::InvalidPageSize(page_size));
        }
        Ok(Self {
            uuid: document.as_str().to_string(),
            page,
            page_size,
        })
    }
}

/// One chunk as returned by the service. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_id: i64,
    pub content: String,
}

/// Response of the chunk-listing endpoint.
///
/// `error == ""` means success; any other value means failure and `chunks`
/// must not be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunksPayload {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub chunks: Vec<ChunkRecord>,
}

impl ChunksPayload {
    pub fn ok(chunks: Vec<ChunkRecord>) -> Self {
        Self {
            error: String::new(),
            chunks,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            chunks: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
