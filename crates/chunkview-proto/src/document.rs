use crate::ProtoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a document on the chunk service (the `uuid` field on the wire).
///
/// Never empty: a view with no selected document holds `Option<DocumentId>`
/// instead of a blank id, so the gateway can never be asked for one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Result<Self, ProtoError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ProtoError::EmptyDocumentId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = ProtoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_ids() {
        assert_eq!(DocumentId::new(""), Err(ProtoError::EmptyDocumentId));
        assert_eq!(DocumentId::new("   "), Err(ProtoError::EmptyDocumentId));
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let id = DocumentId::new("  4b1c-77 \n").unwrap();
        assert_eq!(id.as_str(), "4b1c-77");
        assert_eq!(id.to_string(), "4b1c-77");
    }

    #[test]
    fn test_parse_via_from_str() {
        let id: DocumentId = "doc-42".parse().unwrap();
        assert_eq!(id.as_str(), "doc-42");
        assert!("".parse::<DocumentId>().is_err());
    }
}
