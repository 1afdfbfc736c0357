//! RagService — the retrieval entry point.
//!
//! Collections load lazily, once. The service moves through
//! `Uninitialized → Loading → Ready | Failed`; callers that arrive while a
//! load is in flight await that same load. A `Failed` service retries on the
//! next `initialize`. `reload` swaps in a fresh snapshot, and searches that
//! already hold the old `Arc` finish against it.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;

use super::context_builder::{format_as_context, ContextInput};
use super::documents::{ExamQuestion, Procedure, Standard};
use super::error::RagError;
use super::keywords::{extract_keywords, merge_keywords};
use super::loader::{load_collections, Collections};
use super::searcher;
use super::source::{source_from_settings, DocumentSource};
use crate::core::config::RagSettings;

type LoadFuture = Shared<BoxFuture<'static, Result<Arc<Collections>, RagError>>>;

enum InitState {
    Uninitialized,
    Loading(LoadFuture),
    Ready(Arc<Collections>),
    Failed(RagError),
}

impl InitState {
    fn name(&self) -> &'static str {
        match self {
            InitState::Uninitialized => "uninitialized",
            InitState::Loading(_) => "loading",
            InitState::Ready(_) => "ready",
            InitState::Failed(_) => "failed",
        }
    }
}

/// Everything `search_all` produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAllResult {
    pub context: String,
    pub procedures: Vec<Procedure>,
    pub standards: Vec<Standard>,
    pub exam_questions: Vec<ExamQuestion>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagStatus {
    pub state: &'static str,
    pub error: Option<String>,
    pub source: String,
    pub procedures: usize,
    pub standards: usize,
    pub exams: usize,
    pub exam_questions: usize,
}

#[derive(Clone)]
pub struct RagService {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn DocumentSource>,
    settings: RagSettings,
    state: Mutex<InitState>,
}

impl RagService {
    pub fn new(source: Arc<dyn DocumentSource>, settings: RagSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                settings,
                state: Mutex::new(InitState::Uninitialized),
            }),
        }
    }

    pub fn from_settings(settings: RagSettings) -> Result<Self, RagError> {
        let source = source_from_settings(&settings)?;
        Ok(Self::new(source, settings))
    }

    /// Loads the collections if needed and returns the current snapshot.
    pub async fn initialize(&self) -> Result<Arc<Collections>, RagError> {
        let pending = {
            let mut state = self.lock_state();
            match &*state {
                InitState::Ready(collections) => return Ok(collections.clone()),
                InitState::Loading(pending) => pending.clone(),
                InitState::Uninitialized | InitState::Failed(_) => {
                    tracing::info!("Loading RAG collections from {}", self.inner.source.describe());
                    let pending = self.load_future();
                    *state = InitState::Loading(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;
        self.finish_load(&pending, &result);
        result
    }

    /// Loads a fresh snapshot and swaps it in. On failure the previous
    /// snapshot, if any, stays in place.
    pub async fn reload(&self) -> Result<Arc<Collections>, RagError> {
        match load_collections(self.inner.source.as_ref(), &self.inner.settings).await {
            Ok(collections) => {
                let collections = Arc::new(collections);
                *self.lock_state() = InitState::Ready(collections.clone());
                Ok(collections)
            }
            Err(err) => {
                tracing::error!("RAG reload failed: {}", err);
                Err(err)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.lock_state(), InitState::Ready(_))
    }

    pub fn status(&self) -> RagStatus {
        let state = self.lock_state();
        let mut status = RagStatus {
            state: state.name(),
            error: None,
            source: self.inner.source.describe(),
            procedures: 0,
            standards: 0,
            exams: 0,
            exam_questions: 0,
        };
        match &*state {
            InitState::Ready(collections) => {
                status.procedures = collections.procedures.len();
                status.standards = collections.standards.len();
                status.exams = collections.exams.len();
                status.exam_questions = collections.exam_question_count();
            }
            InitState::Failed(err) => status.error = Some(err.to_string()),
            _ => {}
        }
        status
    }

    pub fn search_procedures(&self, keywords: &[String], limit: Option<usize>) -> Vec<Procedure> {
        let Some(collections) = self.ready_snapshot("procedures") else {
            return Vec::new();
        };
        let limit = limit.unwrap_or(self.inner.settings.procedure_limit);
        searcher::search_procedures(&collections, keywords, limit)
    }

    pub fn search_standards(
        &self,
        query: &str,
        keywords: Option<&[String]>,
        limit: Option<usize>,
    ) -> Vec<Standard> {
        let Some(collections) = self.ready_snapshot("standards") else {
            return Vec::new();
        };
        let settings = &self.inner.settings;
        let limit = limit.unwrap_or(settings.standard_limit);
        searcher::search_standards(&collections, query, keywords, limit, settings.max_keywords)
    }

    pub fn search_exam_questions(
        &self,
        keywords: &[String],
        limit: Option<usize>,
    ) -> Vec<ExamQuestion> {
        let Some(collections) = self.ready_snapshot("exam questions") else {
            return Vec::new();
        };
        let limit = limit.unwrap_or(self.inner.settings.exam_limit);
        searcher::search_exam_questions(&collections, keywords, limit)
    }

    /// Extracts keywords from `query`, merges `custom_keywords`, searches all
    /// three collections and renders the context block.
    pub async fn search_all(
        &self,
        query: &str,
        custom_keywords: &[String],
    ) -> Result<SearchAllResult, RagError> {
        let collections = self.initialize().await?;
        let settings = &self.inner.settings;

        let extracted = extract_keywords(query, settings.max_keywords);
        let keywords = merge_keywords(&extracted, custom_keywords);
        let shared_keywords = (!keywords.is_empty()).then_some(keywords.as_slice());

        let (procedures, standards, exam_questions) = tokio::join!(
            async { searcher::search_procedures(&collections, &keywords, settings.procedure_limit) },
            async {
                searcher::search_standards(
                    &collections,
                    query,
                    shared_keywords,
                    settings.standard_limit,
                    settings.max_keywords,
                )
            },
            async { searcher::search_exam_questions(&collections, &keywords, settings.exam_limit) },
        );

        let context = format_as_context(&ContextInput {
            procedures: &procedures,
            standards: &standards,
            exam_questions: &exam_questions,
        });

        tracing::debug!(
            "search_all keywords={:?} procedures={} standards={} exam_questions={}",
            keywords,
            procedures.len(),
            standards.len(),
            exam_questions.len()
        );

        Ok(SearchAllResult {
            context,
            procedures,
            standards,
            exam_questions,
            keywords,
        })
    }

    fn load_future(&self) -> LoadFuture {
        let source = self.inner.source.clone();
        let settings = self.inner.settings.clone();
        async move {
            load_collections(source.as_ref(), &settings)
                .await
                .map(Arc::new)
        }
        .boxed()
        .shared()
    }

    fn finish_load(&self, pending: &LoadFuture, result: &Result<Arc<Collections>, RagError>) {
        let mut state = self.lock_state();
        let InitState::Loading(current) = &*state else {
            return;
        };
        if !current.ptr_eq(pending) {
            return;
        }
        *state = match result {
            Ok(collections) => InitState::Ready(collections.clone()),
            Err(err) => {
                tracing::error!("RAG initialization failed ({}): {}", err.category(), err);
                InitState::Failed(err.clone())
            }
        };
    }

    fn ready_snapshot(&self, collection: &str) -> Option<Arc<Collections>> {
        let state = self.lock_state();
        match &*state {
            InitState::Ready(collections) => Some(collections.clone()),
            other => {
                tracing::warn!(
                    "RAG service is {}; returning no {} results",
                    other.name(),
                    collection
                );
                None
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, InitState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
