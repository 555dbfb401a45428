//! Source-code slicing, chunking, and language detection.
//!
//! Provides the two artifact producers the enrichment handlers build on:
//! `LineWindowSlicer` (structural-ish overlapping windows, for
//! `ExtractSnippets`) and `FixedCharChunker` (fixed-size character chunks
//! with binary rejection, for `ChunkFiles`), plus `TokenBudget` for
//! batching/truncating documents before they reach an embedder.

pub mod chunking;
pub mod error;
pub mod parsing;
pub mod slicing;

pub use chunking::{CharChunk, Document, FixedCharChunker, TiktokenBudget, TokenBudget, TokenCounter};
pub use error::{ParsingError, ParsingResult};
pub use parsing::get_language_from_extension;
pub use slicing::{LineWindow, LineWindowSlicer};
