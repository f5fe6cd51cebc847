use crate::model::SchemaModel;
use crate::util::{Result, SchemaError};
use glob::glob;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load models from multiple sources (files, directories, glob patterns).
///
/// Files are read in sorted order per source. Two models with the same name
/// are rejected since they would target the same table.
pub fn load_models(sources: &[String]) -> Result<Vec<SchemaModel>> {
    let mut models = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for source in sources {
        for path in resolve_source(source)? {
            let model = load_model_file(&path)?;
            if let Some(previous) = seen.get(model.name()) {
                return Err(SchemaError::ParseError(format!(
                    "Model {} is defined in both {} and {}",
                    model.name(),
                    previous.display(),
                    path.display()
                )));
            }
            debug!(model = model.name(), path = %path.display(), "loaded model");
            seen.insert(model.name().to_string(), path);
            models.push(model);
        }
    }

    Ok(models)
}

/// Reads and validates a single JSON model file.
pub fn load_model_file(path: &Path) -> Result<SchemaModel> {
    let content = fs::read_to_string(path).map_err(|e| {
        SchemaError::ParseError(format!("Failed to read {}: {e}", path.display()))
    })?;

    SchemaModel::from_json(&content).map_err(|e| match e {
        SchemaError::ParseError(message) => {
            SchemaError::ParseError(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Resolve a source pattern to a list of model file paths.
/// Handles: single files, directories (recursive *.json), and glob patterns.
fn resolve_source(source: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(source);

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let pattern = path.join("**/*.json");
        return resolve_glob(pattern.to_str().unwrap_or(source));
    }

    resolve_glob(source)
}

fn resolve_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern)
        .map_err(|e| SchemaError::ParseError(format!("Invalid glob pattern: {e}")))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SchemaError::ParseError(format!("Glob error: {e}")))?;
        if path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(SchemaError::ParseError(format!(
            "No model files found matching pattern: {pattern}"
        )));
    }

    files.sort();
    Ok(files)
}
