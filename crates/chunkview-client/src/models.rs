use chunkview_proto::ChunkRecord;

/// A chunk as held in the page window.
///
/// Identified by its slot in the window; `chunk_id` is only shown as a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_id: i64,
    pub content: String,
}

impl From<ChunkRecord> for Chunk {
    fn from(record: ChunkRecord) -> Self {
        Self {
            chunk_id: record.chunk_id,
            content: record.content,
        }
    }
}
