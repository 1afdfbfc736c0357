use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::settings::RagSettings;
use super::validation::validate_config;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    /// Project-level `config.yml`, or the file named by `AUDIT_RAG_CONFIG_PATH`.
    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("AUDIT_RAG_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        self.paths.project_root.join("config.yml")
    }

    /// Per-user overrides layered on top of the project config.
    pub fn user_config_path(&self) -> PathBuf {
        self.paths.user_data_dir.join("config.yml")
    }

    pub fn load_config(&self) -> Result<Value, ApiError> {
        let base_path = self.config_path();
        let user_path = self.user_config_path();

        let base = load_yaml_file(&base_path);
        let merged = if user_path != base_path {
            deep_merge(&base, &load_yaml_file(&user_path))
        } else {
            base
        };

        validate_config(&merged)?;
        Ok(merged)
    }

    pub fn rag_settings(&self) -> Result<RagSettings, ApiError> {
        let config = self.load_config()?;
        Ok(RagSettings::from_config(&config, &self.paths))
    }

    pub fn server_host(&self) -> String {
        self.load_config()
            .ok()
            .as_ref()
            .and_then(|config| config.get("server"))
            .and_then(|server| server.get("host"))
            .and_then(|host| host.as_str())
            .unwrap_or("127.0.0.1")
            .to_string()
    }
}

fn load_yaml_file(path: &Path) -> Value {
    if !path.exists() {
        return Value::Object(Map::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Value>(&contents) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => Value::Object(Map::new()),
            Err(err) => {
                tracing::warn!("Ignoring unparsable config {}: {}", path.display(), err);
                Value::Object(Map::new())
            }
        },
        Err(_) => Value::Object(Map::new()),
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_overrides_nested_keys_only() {
        let base = json!({"rag": {"max_keywords": 5, "exam_limit": 2}, "server": {"host": "0.0.0.0"}});
        let user = json!({"rag": {"max_keywords": 7}});

        let merged = deep_merge(&base, &user);
        assert_eq!(merged["rag"]["max_keywords"], 7);
        assert_eq!(merged["rag"]["exam_limit"], 2);
        assert_eq!(merged["server"]["host"], "0.0.0.0");
    }

    #[test]
    fn user_config_overrides_project_config() {
        let root = tempfile::tempdir().expect("tempdir");
        let data = tempfile::tempdir().expect("tempdir");
        fs::write(
            root.path().join("config.yml"),
            "rag:\n  max_keywords: 6\n  exam_limit: 4\n",
        )
        .expect("write project config");
        fs::write(data.path().join("config.yml"), "rag:\n  exam_limit: 1\n")
            .expect("write user config");

        let paths = Arc::new(AppPaths::with_dirs(
            root.path().to_path_buf(),
            data.path().to_path_buf(),
        ));
        let service = ConfigService::new(paths);
        let settings = service.rag_settings().expect("settings");

        assert_eq!(settings.max_keywords, 6);
        assert_eq!(settings.exam_limit, 1);
    }

    #[test]
    fn missing_files_yield_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        let paths = Arc::new(AppPaths::with_dirs(
            root.path().to_path_buf(),
            root.path().join("user"),
        ));
        let service = ConfigService::new(paths);

        let settings = service.rag_settings().expect("settings");
        assert_eq!(settings, RagSettings::with_data_source(root.path().join("data").to_string_lossy()));
        assert_eq!(service.server_host(), "127.0.0.1");
    }
}
