//! Format extractors: raw source bytes/text to ordered chunk streams

pub mod chat;
pub mod document;
pub mod text;
pub mod web;
