//! Per-collection lexical search.
//!
//! Every searcher has the same shape: build each document's surrogate text,
//! score it, drop zero scores, sort descending (stable, so ties keep
//! collection order) and keep the first `limit`.

use std::cmp::Ordering;

use super::documents::{flatten_exams, ExamQuestion, Procedure, Searchable, Standard};
use super::keywords::{calculate_relevance_score, extract_keywords};
use super::loader::Collections;

/// A document with the score it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub score: f64,
    pub document: T,
}

/// Ranks `documents` against `keywords`, best first.
pub fn rank_scored<'a, T: Searchable>(
    documents: &'a [T],
    keywords: &[String],
    limit: usize,
) -> Vec<Scored<&'a T>> {
    if keywords.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<Scored<&T>> = documents
        .iter()
        .map(|document| Scored {
            score: calculate_relevance_score(&document.surrogate_text(), keywords),
            document,
        })
        .filter(|s| s.score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}

fn rank<T: Searchable + Clone>(documents: &[T], keywords: &[String], limit: usize) -> Vec<T> {
    rank_scored(documents, keywords, limit)
        .into_iter()
        .map(|s| s.document.clone())
        .collect()
}

pub fn search_procedures(
    collections: &Collections,
    keywords: &[String],
    limit: usize,
) -> Vec<Procedure> {
    rank(&collections.procedures, keywords, limit)
}

/// Searches standards, extracting keywords from `query` when none are given.
pub fn search_standards(
    collections: &Collections,
    query: &str,
    keywords: Option<&[String]>,
    limit: usize,
    max_keywords: usize,
) -> Vec<Standard> {
    match keywords {
        Some(keywords) if !keywords.is_empty() => rank(&collections.standards, keywords, limit),
        _ => {
            let own = extract_keywords(query, max_keywords);
            rank(&collections.standards, &own, limit)
        }
    }
}

/// Flattens the exam bank on every call, then ranks sub-questions.
pub fn search_exam_questions(
    collections: &Collections,
    keywords: &[String],
    limit: usize,
) -> Vec<ExamQuestion> {
    let flattened = flatten_exams(&collections.exams);
    rank(&flattened, keywords, limit)
}
