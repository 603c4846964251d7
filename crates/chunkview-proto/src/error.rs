use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    #[error("Document id must not be empty")]
    EmptyDocumentId,

    #[error("Page number must be at least 1 (got {0})")]
    InvalidPage(u32),

    #[error("Page size must be at least 1 (got {0})")]
    InvalidPageSize(u32),
}
