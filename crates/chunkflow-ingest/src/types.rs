//! Chunk metadata types for each source format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metadata for a chunk extracted from a paginated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// First page covered by this chunk (1-indexed)
    pub page_start: u32,
    /// Last page covered by this chunk; always >= `page_start`
    pub page_end: u32,
    /// Caller-supplied source label; chunks from different sources never merge
    pub source_name: String,
    /// Embedded document title, falling back to the source name
    pub title: String,
    /// Second non-empty text line of page 1, kept as a fallback label since
    /// embedded titles are frequently absent
    pub secondary_title: String,
    /// Total pages in the source document
    pub page_count: u32,
}

/// Metadata for a chunk extracted from a web page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebMeta {
    /// Document title, or `"N/A"` when the page has none
    pub title: String,
}

/// Metadata for a chunk extracted from a chat export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMeta {
    /// Channel the messages came from; chunks from different channels never merge
    pub channel: String,
    /// Resolved display names of the authors, unique and sorted
    pub users: Vec<String>,
    /// Date of the earliest message in this chunk
    pub start_date: NaiveDate,
    /// Date of the latest message in this chunk
    pub end_date: NaiveDate,
    /// Channel purpose from the channels manifest
    pub channel_purpose: String,
    /// Channel topic from the channels manifest
    pub channel_topic: String,
}

/// Metadata for a chunk produced by the plain-text splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMeta {
    /// Zero-based position of this chunk in the split
    pub chunk_index: usize,
    /// Total chunks produced by the split
    pub total_chunks: usize,
}
