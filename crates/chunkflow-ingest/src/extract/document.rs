//! Paginated-document extraction
//!
//! One chunk per physical page. Page text comes from an injected
//! `PageSource` — the rendering callback may be asynchronous (an external
//! renderer, an OCR service), so extraction awaits pages in page order to
//! keep chunk emission ordered. `PdfPages` is the built-in source over a
//! PDF byte buffer.

use async_trait::async_trait;

use chunkflow_core::{Chunk, CombineContext, CombineStrategy};

use crate::error::{Error, Result};
use crate::types::DocumentMeta;

/// A paginated source that can render one page at a time
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Total number of physical pages
    fn page_count(&self) -> usize;

    /// Render the text of one page (1-indexed)
    async fn render_page(&self, page_number: usize) -> Result<String>;

    /// Embedded document title, when the format carries one
    fn title(&self) -> Option<String> {
        None
    }
}

/// Extract one chunk per page from a paginated source
///
/// A page-render failure fails the whole extraction; whether to skip the
/// document or retry is the caller's policy.
pub async fn extract_paginated<S>(
    source: &S,
    source_name: &str,
) -> Result<Vec<Chunk<DocumentMeta>>>
where
    S: PageSource + ?Sized,
{
    let page_count = source.page_count();
    let title = source
        .title()
        .unwrap_or_else(|| source_name.to_string());

    let mut pages = Vec::with_capacity(page_count);
    for page_number in 1..=page_count {
        pages.push(source.render_page(page_number).await?);
    }

    let secondary_title = pages
        .first()
        .map(|first| second_nonempty_line(first))
        .unwrap_or_default();

    tracing::debug!(
        "Extracted {} pages from '{}' (title: '{}')",
        page_count,
        source_name,
        title
    );

    let chunks = pages
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let page = index as u32 + 1;
            Chunk::new(
                text,
                DocumentMeta {
                    page_start: page,
                    page_end: page,
                    source_name: source_name.to_string(),
                    title: title.clone(),
                    secondary_title: secondary_title.clone(),
                    page_count: page_count as u32,
                },
            )
        })
        .collect();

    Ok(chunks)
}

/// Extract page chunks from a PDF byte buffer
pub async fn extract_pdf(data: &[u8], source_name: &str) -> Result<Vec<Chunk<DocumentMeta>>> {
    let pages = PdfPages::from_bytes(data)?;
    extract_paginated(&pages, source_name).await
}

/// Built-in `PageSource` over a PDF byte buffer
pub struct PdfPages {
    pages: Vec<String>,
    title: Option<String>,
}

impl PdfPages {
    /// Parse a PDF buffer into per-page text
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| Error::document_extract("document.pdf", e.to_string()))?;

        let mut title = None;
        if let Ok(doc) = lopdf::Document::load_mem(data) {
            let declared = doc.get_pages().len();
            if declared != pages.len() {
                tracing::debug!(
                    "PDF declares {} pages but {} rendered",
                    declared,
                    pages.len()
                );
            }
            title = embedded_title(&doc);
        }

        Ok(Self { pages, title })
    }
}

#[async_trait]
impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn render_page(&self, page_number: usize) -> Result<String> {
        self.pages
            .get(page_number - 1)
            .cloned()
            .ok_or_else(|| {
                Error::document_extract("document.pdf", format!("no page {}", page_number))
            })
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }
}

/// Read the Info dictionary title, if any
fn embedded_title(doc: &lopdf::Document) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info = match info {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let title = info.as_dict().ok()?.get(b"Title").ok()?;
    if let lopdf::Object::String(bytes, _) = title {
        let decoded = decode_pdf_string(bytes);
        let trimmed = decoded.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    } else {
        None
    }
}

/// PDF text strings are either UTF-16BE with a BOM or PDFDocEncoding
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Second non-empty text line, used as a fallback label
fn second_nonempty_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

/// Merge policy for paginated-document chunks
///
/// Merges only within the same source. The reducer admits a pair when the
/// accumulator alone is under budget, so the joined text can still overflow;
/// this strategy re-validates the merged encoding and splits it at the exact
/// budget boundary when needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentStrategy;

impl CombineStrategy<DocumentMeta> for DocumentStrategy {
    fn combine(
        &self,
        first: Chunk<DocumentMeta>,
        second: Chunk<DocumentMeta>,
        ctx: &CombineContext<'_>,
    ) -> chunkflow_core::Result<Vec<Chunk<DocumentMeta>>> {
        if first.metadata.source_name != second.metadata.source_name {
            return Ok(vec![first, second]);
        }

        let merged_text = format!("{}\n{}", first.text, second.text);
        let merged_ids = ctx.tokenizer.encode(&merged_text);
        let merged_meta = DocumentMeta {
            page_start: first.metadata.page_start.min(second.metadata.page_start),
            page_end: first.metadata.page_end.max(second.metadata.page_end),
            ..first.metadata.clone()
        };

        if merged_ids.len() <= ctx.target_chunk_size {
            return Ok(vec![Chunk::with_encoding(merged_text, merged_meta, merged_ids)]);
        }

        // Split the already-tokenized sequence at the budget boundary. The
        // second piece keeps the second chunk's page range even though its
        // text is a partial prefix; per-token page attribution is out of
        // scope.
        let (head, tail) = merged_ids.split_at(ctx.target_chunk_size);
        let head_text = ctx.tokenizer.decode(head)?;
        let tail_text = ctx.tokenizer.decode(tail)?;
        Ok(vec![
            Chunk::with_encoding(head_text, first.metadata, head.to_vec()),
            Chunk::with_encoding(tail_text, second.metadata, tail.to_vec()),
        ])
    }
}
