//! chunkflow-ingest: source-format extraction for the chunkflow pipeline
//!
//! Turns heterogeneous raw sources into ordered, token-aware chunk streams:
//! paginated documents (one chunk per page), web pages (one main-content
//! chunk), chat-export archives (one chunk per message), and plain text
//! (sliding token windows). Each paginated/chat format ships the combine
//! strategy the `chunkflow-core` reducer pairs with it.
//!
//! Two pure utilities operate on the same text model: a regex-schema
//! metadata scanner and a prompt-template variable analyzer.

pub mod config;
pub mod error;
pub mod extract;
pub mod scan;
pub mod template;
pub mod types;

pub use config::ChunkingConfig;
pub use error::{Error, Result};
pub use extract::chat::{extract_chat_export, ChatStrategy};
pub use extract::document::{extract_paginated, extract_pdf, DocumentStrategy, PageSource, PdfPages};
pub use extract::text::{split_text, SplitOptions};
pub use extract::web::extract_web_page;
pub use scan::{scan_metadata, MetadataSchema, PropertySpec, PropertyType, ScanAux};
pub use template::{parse_prompt_template, PromptInfo};
pub use types::{ChatMeta, DocumentMeta, TextMeta, WebMeta};

/// Re-export the core crate for convenience
pub use chunkflow_core;
