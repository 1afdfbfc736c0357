//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `RagService`: lazily loads the collections and runs `search_all`
//! - lexical keyword extraction and relevance scoring
//! - per-collection searchers and the context block formatter
//! - int8 embedding quantization (`VectorCodec`)

mod context_builder;
mod documents;
mod error;
mod keywords;
mod loader;
mod quantizer;
mod searcher;
mod service;
mod source;


pub use context_builder::{
    format_as_context, ContextInput, EXAM_QUESTIONS_HEADING, PROCEDURES_HEADING,
    STANDARDS_HEADING,
};
pub use documents::{
    flatten_exams, Exam, ExamCase, ExamQuestion, Procedure, Searchable, Standard, SubQuestion,
};
pub use error::RagError;
pub use keywords::{calculate_relevance_score, extract_keywords, merge_keywords};
pub use loader::{load_collections, load_collections_until, Collections};
pub use quantizer::{
    cosine_similarity, dequantize_record, quantize_collection, QuantizationReport,
    QuantizedVector, StoredEmbedding, VectorCodec, QUANTIZED_FIELD,
};
pub use searcher::{
    rank_scored, search_exam_questions, search_procedures, search_standards, Scored,
};
pub use service::{RagService, RagStatus, SearchAllResult};
pub use source::{source_from_settings, DocumentSource, FileSource, HttpSource};
