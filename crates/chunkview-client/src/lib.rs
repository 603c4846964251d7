pub mod config;
pub mod cursor;
pub mod display;
pub mod gateway;
pub mod models;
pub mod source;
pub mod utils;

pub use config::Settings;
pub use cursor::{ChunkCursor, CursorPosition, CursorState};
pub use display::DisplayMode;
pub use gateway::{FetchFailure, FetchGateway, FetchOutcome, LoadingFlag};
pub use models::Chunk;
pub use source::{ChunkSource, HttpChunkSource, MemoryChunkSource};
pub use utils::error::{ClientError, FetchError};
pub use utils::metrics::{GatewayMetrics, MetricsSnapshot};

pub use chunkview_proto::{DocumentId, DEFAULT_PAGE_SIZE};
