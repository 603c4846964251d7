use super::ChunkSource;
use crate::utils::error::FetchError;
use async_trait::async_trait;
use chunkview_proto::{ChunkRecord, ChunksPayload, ChunksRequest};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-process chunk service: fixed collections sliced into 1-based pages.
///
/// Used for the `--demo` viewer and for tests. Every request is recorded so
/// callers can check which pages were fetched.
#[derive(Default)]
pub struct MemoryChunkSource {
    documents: HashMap<String, Vec<ChunkRecord>>,
    failing_pages: Mutex<HashMap<u32, String>>,
    requests: Mutex<Vec<ChunksRequest>>,
}

impl MemoryChunkSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, uuid: impl Into<String>, chunks: Vec<ChunkRecord>) -> Self {
        self.documents.insert(uuid.into(), chunks);
        self
    }

    /// Add a document with `count` generated chunks (ids `0..count`).
    pub fn with_synthetic_document(self, uuid: impl Into<String>, count: usize) -> Self {
        let uuid = uuid.into();
        let chunks = (0..count)
            .map(|i| ChunkRecord {
                chunk_id: i as i64,
                content: synthetic_content(&uuid, i),
            })
            .collect();
        self.with_document(uuid, chunks)
    }

    /// Answer every request for `page` with `error` in the payload.
    pub fn fail_page(&self, page: u32, error: impl Into<String>) {
        self.failing_pages.lock().insert(page, error.into());
    }

    pub fn heal_page(&self, page: u32) {
        self.failing_pages.lock().remove(&page);
    }

    pub fn requests(&self) -> Vec<ChunksRequest> {
        self.requests.lock().clone()
    }

    /// Page numbers requested so far, in order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().iter().map(|r| r.page).collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }
}

#[async_trait]
impl ChunkSource for MemoryChunkSource {
    async fn list_chunks(&self, request: &ChunksRequest) -> Result<ChunksPayload, FetchError> {
        self.requests.lock().push(request.clone());

        if let Some(error) = self.failing_pages.lock().get(&request.page) {
            return Ok(ChunksPayload::failed(error.clone()));
        }

        let Some(chunks) = self.documents.get(&request.uuid) else {
            return Ok(ChunksPayload::failed(format!(
                "Document {} not found",
                request.uuid
            )));
        };

        let page_size = request.page_size as usize;
        let start = (request.page.saturating_sub(1) as usize).saturating_mul(page_size);
        if start >= chunks.len() {
            return Ok(ChunksPayload::ok(Vec::new()));
        }
        let end = start.saturating_add(page_size).min(chunks.len());

        Ok(ChunksPayload::ok(chunks[start..end].to_vec()))
    }
}

fn synthetic_content(uuid: &str, index: usize) -> String {
    if index % 3 == 2 {
        format!(
            "```rust\n// {} / chunk {}\nfn chunk_{}() -> usize {{\n    {}\n}}\n```",
            uuid, index, index, index
        )
    } else {
        format!(
            "## Chunk {}\n\nParagraph {} of document `{}`.",
            index, index, uuid
        )
    }
}
