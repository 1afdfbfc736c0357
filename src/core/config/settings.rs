use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::paths::AppPaths;

pub const DEFAULT_EXAM_YEAR_FLOOR: i32 = 2015;
pub const DEFAULT_MAX_KEYWORDS: usize = 5;
pub const DEFAULT_PROCEDURE_LIMIT: usize = 3;
pub const DEFAULT_STANDARD_LIMIT: usize = 3;
pub const DEFAULT_EXAM_LIMIT: usize = 2;

/// Settings for the retrieval service, read from the `rag` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSettings {
    /// Base URL (`http://`, `https://`) or directory holding the collections.
    pub data_source: String,
    pub procedures_path: String,
    pub standards_path: String,
    /// Directory (relative to `data_source`) of `<year>_hierarchical.json` files.
    pub exams_dir: String,
    pub exam_year_floor: i32,
    pub max_keywords: usize,
    pub procedure_limit: usize,
    pub standard_limit: usize,
    pub exam_limit: usize,
    pub request_timeout_secs: u64,
}

impl RagSettings {
    pub fn with_data_source(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            procedures_path: "procedures.json".to_string(),
            standards_path: "standards.json".to_string(),
            exams_dir: "exams".to_string(),
            exam_year_floor: DEFAULT_EXAM_YEAR_FLOOR,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            procedure_limit: DEFAULT_PROCEDURE_LIMIT,
            standard_limit: DEFAULT_STANDARD_LIMIT,
            exam_limit: DEFAULT_EXAM_LIMIT,
            request_timeout_secs: 30,
        }
    }

    pub fn from_config(config: &Value, paths: &AppPaths) -> Self {
        let defaults =
            Self::with_data_source(paths.default_data_source().to_string_lossy().to_string());
        let Some(rag) = config.get("rag") else {
            return defaults;
        };

        let string_or = |key: &str, fallback: String| {
            rag.get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback)
        };
        let limit_or = |key: &str, fallback: usize| {
            rag.get(key)
                .and_then(|v| v.as_u64())
                .map(|v| v.clamp(1, 20) as usize)
                .unwrap_or(fallback)
        };

        Self {
            data_source: string_or("data_source", defaults.data_source.clone()),
            procedures_path: string_or("procedures_path", defaults.procedures_path.clone()),
            standards_path: string_or("standards_path", defaults.standards_path.clone()),
            exams_dir: string_or("exams_dir", defaults.exams_dir.clone()),
            exam_year_floor: rag
                .get("exam_year_floor")
                .and_then(|v| v.as_i64())
                .map(|v| v as i32)
                .unwrap_or(defaults.exam_year_floor),
            max_keywords: limit_or("max_keywords", defaults.max_keywords),
            procedure_limit: limit_or("procedure_limit", defaults.procedure_limit),
            standard_limit: limit_or("standard_limit", defaults.standard_limit),
            exam_limit: limit_or("exam_limit", defaults.exam_limit),
            request_timeout_secs: rag
                .get("request_timeout_secs")
                .and_then(|v| v.as_u64())
                .map(|v| v.clamp(1, 600))
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Path of one year's hierarchical exam file, relative to `data_source`.
    pub fn exam_file_path(&self, year: i32) -> String {
        let dir = self.exams_dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("{}_hierarchical.json", year)
        } else {
            format!("{}/{}_hierarchical.json", dir, year)
        }
    }
}
