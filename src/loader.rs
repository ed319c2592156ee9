use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::DiffTreeError;

/// Load and parse a JSON file
pub fn load_json_file(path: &Path) -> Result<Value, DiffTreeError> {
    // Check if file exists
    if !path.exists() {
        return Err(DiffTreeError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ),
        });
    }

    // Check if it's a file (not a directory)
    if !path.is_file() {
        return Err(DiffTreeError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Not a file: {}", path.display()),
            ),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| DiffTreeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DiffTreeError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Looks like JSON rather than a file name
fn is_inline_json(input: &str) -> bool {
    let trimmed = input.trim_start();
    trimmed.starts_with(['{', '[', '"'])
        || matches!(trimmed.trim_end(), "null" | "true" | "false")
        || trimmed.parse::<f64>().is_ok()
}

/// Load a CLI input: an existing file path, or inline JSON text
pub fn load_json_input(input: &str) -> Result<Value, DiffTreeError> {
    let path = Path::new(input);
    if path.is_file() || !is_inline_json(input) {
        return load_json_file(path);
    }

    serde_json::from_str(input).map_err(|source| DiffTreeError::JsonParse {
        path: "<inline>".into(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_json() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"name": "test", "value": 42}"#).unwrap();

        let value = load_json_file(temp_file.path()).unwrap();
        assert_eq!(value["name"], "test");
        assert_eq!(value["value"], 42);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_json_file(&PathBuf::from("/nonexistent/file.json"));
        assert!(matches!(result, Err(DiffTreeError::FileRead { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"invalid": json}"#).unwrap();

        let result = load_json_file(temp_file.path());
        assert!(matches!(result, Err(DiffTreeError::JsonParse { .. })));
    }

    #[test]
    fn test_load_inline_input() {
        assert_eq!(load_json_input(r#"{"a": 1}"#).unwrap()["a"], 1);
        assert_eq!(load_json_input("[1, 2]").unwrap()[1], 2);
        assert_eq!(load_json_input("42").unwrap(), 42);
        assert!(load_json_input("null").unwrap().is_null());
    }

    #[test]
    fn test_load_input_prefers_existing_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[true]").unwrap();

        let value = load_json_input(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(value[0], true);
    }

    #[test]
    fn test_load_input_missing_file() {
        assert!(matches!(
            load_json_input("missing-file.json"),
            Err(DiffTreeError::FileRead { .. })
        ));
        assert!(matches!(
            load_json_input("{broken"),
            Err(DiffTreeError::JsonParse { .. })
        ));
    }
}
