//! Loading the collections from a `DocumentSource`.

use chrono::Datelike;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;

use super::documents::{Exam, Procedure, Standard};
use super::error::RagError;
use super::source::DocumentSource;
use crate::core::config::RagSettings;

/// One immutable snapshot of every collection.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub procedures: Vec<Procedure>,
    pub standards: Vec<Standard>,
    pub exams: Vec<Exam>,
}

impl Collections {
    pub fn exam_question_count(&self) -> usize {
        self.exams
            .iter()
            .flat_map(|exam| exam.cases.iter())
            .map(|case| case.sub_questions.len())
            .sum()
    }
}

pub async fn load_collections(
    source: &dyn DocumentSource,
    settings: &RagSettings,
) -> Result<Collections, RagError> {
    load_collections_until(source, settings, chrono::Local::now().year()).await
}

/// Loads procedures, standards and the exam years `current_year..=floor`.
///
/// Procedures and standards are required: any failure aborts the load. Exam
/// years are optional and a failing year only drops that year.
pub async fn load_collections_until(
    source: &dyn DocumentSource,
    settings: &RagSettings,
    current_year: i32,
) -> Result<Collections, RagError> {
    let (procedures, standards, exams) = tokio::try_join!(
        load_required::<Procedure>(source, &settings.procedures_path),
        load_required::<Standard>(source, &settings.standards_path),
        async { Ok::<_, RagError>(probe_exam_years(source, settings, current_year).await) },
    )?;

    let collections = Collections {
        procedures,
        standards,
        exams,
    };

    tracing::info!(
        "Loaded RAG collections from {}: {} procedures, {} standards, {} exams ({} questions)",
        source.describe(),
        collections.procedures.len(),
        collections.standards.len(),
        collections.exams.len(),
        collections.exam_question_count()
    );

    Ok(collections)
}

async fn load_required<T: DeserializeOwned>(
    source: &dyn DocumentSource,
    path: &str,
) -> Result<Vec<T>, RagError> {
    let text = source.fetch_text(path).await?;
    serde_json::from_str(&text).map_err(|e| RagError::parse(path, e))
}

async fn probe_exam_years(
    source: &dyn DocumentSource,
    settings: &RagSettings,
    current_year: i32,
) -> Vec<Exam> {
    let years: Vec<i32> = (settings.exam_year_floor..=current_year).rev().collect();
    let results = join_all(years.iter().map(|&year| load_exam_year(source, settings, year))).await;

    results.into_iter().flatten().collect()
}

async fn load_exam_year(source: &dyn DocumentSource, settings: &RagSettings, year: i32) -> Vec<Exam> {
    let path = settings.exam_file_path(year);
    let mut exams: Vec<Exam> = match load_required(source, &path).await {
        Ok(exams) => exams,
        Err(err) if err.is_not_found() => {
            tracing::debug!("No exam file for {}", year);
            return Vec::new();
        }
        Err(err) => {
            tracing::debug!("Skipping exam file for {}: {}", year, err);
            return Vec::new();
        }
    };

    for exam in &mut exams {
        if exam.year.is_empty() {
            exam.year = year.to_string();
        }
    }
    exams
}
