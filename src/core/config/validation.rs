use serde_json::{Map, Value};

use crate::core::errors::ApiError;

pub fn validate_config(config: &Value) -> Result<(), ApiError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(rag) = expect_optional_object(root, "rag")? {
        validate_optional_string_field(rag, "rag.data_source", "data_source")?;
        validate_optional_string_field(rag, "rag.procedures_path", "procedures_path")?;
        validate_optional_string_field(rag, "rag.standards_path", "standards_path")?;
        validate_optional_string_field(rag, "rag.exams_dir", "exams_dir")?;
        validate_i64_field(rag, "rag.exam_year_floor", "exam_year_floor", 1990, 2100)?;
        validate_u64_field(rag, "rag.max_keywords", "max_keywords", 1, 20)?;
        validate_u64_field(rag, "rag.procedure_limit", "procedure_limit", 1, 20)?;
        validate_u64_field(rag, "rag.standard_limit", "standard_limit", 1, 20)?;
        validate_u64_field(rag, "rag.exam_limit", "exam_limit", 1, 20)?;
        validate_u64_field(
            rag,
            "rag.request_timeout_secs",
            "request_timeout_secs",
            1,
            600,
        )?;
    }

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ApiError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(out_of_range(path, min, max));
    }
    Ok(())
}

fn validate_i64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: i64,
    max: i64,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_i64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(out_of_range(path, min, max));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ApiError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn out_of_range<T: std::fmt::Display>(path: &str, min: T, max: T) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': must be between {} and {}",
        path, min, max
    ))
}

fn config_type_error(path: &str, expected: &str) -> ApiError {
    ApiError::BadRequest(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_and_full_configs() {
        assert!(validate_config(&json!({})).is_ok());
        let config = json!({
            "rag": {
                "data_source": "https://example.com/data",
                "exam_year_floor": 2016,
                "max_keywords": 7,
                "exam_limit": 2
            },
            "server": {"host": "127.0.0.1"}
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_wrong_types_with_path() {
        let err = validate_config(&json!({"rag": {"max_keywords": "five"}})).unwrap_err();
        assert!(err.to_string().contains("rag.max_keywords"));

        let err = validate_config(&json!({"rag": []})).unwrap_err();
        assert!(err.to_string().contains("'rag'"));
    }

    #[test]
    fn rejects_blank_cors_origins() {
        let config = json!({"server": {"cors_allowed_origins": ["http://localhost:5173", " "]}});
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("server.cors_allowed_origins[1]"));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = validate_config(&json!({"rag": {"exam_year_floor": 1800}})).unwrap_err();
        assert!(err.to_string().contains("between 1990 and 2100"));
    }
}
