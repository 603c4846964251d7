pub mod document;
pub mod error;
pub mod types;

pub use document::*;
pub use error::*;
pub use types::*;

/// Path of the chunk-listing endpoint, relative to the API host.
pub const CHUNKS_ENDPOINT: &str = "/api/get_chunks";

/// Number of chunks requested per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
