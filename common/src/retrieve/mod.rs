//! Retrieving remote content

use time::OffsetDateTime;

/// Metadata of the retrieval process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetrievalMetadata {
    /// Last known modification time
    pub last_modification: Option<OffsetDateTime>,
    /// ETag
    pub etag: Option<String>,
}
