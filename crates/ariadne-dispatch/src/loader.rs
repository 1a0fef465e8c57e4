//! Contract loading and linting.
//!
//! Setup asks a [`ContractLoader`] for the contract document, optionally
//! passes it through a [`ContractLinter`], then builds the router and
//! validator from it. Loading is the only place the pipeline touches the
//! filesystem.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::info;

use crate::error::{DispatchError, DispatchResult};
use crate::handler::BoxFuture;

/// Supplies the contract document.
pub trait ContractLoader: Send + Sync {
    /// Loads the document.
    fn load(&self) -> BoxFuture<'_, DispatchResult<Value>>;
}

/// An in-memory document.
impl ContractLoader for Value {
    fn load(&self) -> BoxFuture<'_, DispatchResult<Value>> {
        Box::pin(async move { Ok(self.clone()) })
    }
}

/// Loads a JSON contract document from a file.
#[derive(Debug, Clone)]
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    /// Creates a loader for `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> DispatchResult<Value> {
        info!(path = %self.path.display(), "loading contract from file");

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            DispatchError::Load(format!(
                "failed to read contract file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            DispatchError::Load(format!(
                "failed to parse contract file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl ContractLoader for JsonFileLoader {
    fn load(&self) -> BoxFuture<'_, DispatchResult<Value>> {
        Box::pin(self.read())
    }
}

/// Checks a loaded document before it is compiled.
pub trait ContractLinter: Send + Sync {
    /// Returns the problems found; an empty list accepts the document.
    fn lint(&self, document: &Value) -> Vec<String>;
}

/// Checks the top-level shape of an OpenAPI 3 document.
///
/// Requires an `openapi` version string starting with `3.`, an `info`
/// object carrying `title` and `version`, and a `paths` object whose keys
/// start with a slash.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureLinter;

impl ContractLinter for StructureLinter {
    fn lint(&self, document: &Value) -> Vec<String> {
        let mut problems = Vec::new();

        match document.get("openapi").and_then(Value::as_str) {
            Some(version) if version.starts_with("3.") => {}
            Some(version) => problems.push(format!("unsupported openapi version '{version}'")),
            None => problems.push("missing openapi version".to_string()),
        }

        match document.get("info") {
            Some(info) if info.is_object() => {
                for field in ["title", "version"] {
                    if info.get(field).and_then(Value::as_str).is_none() {
                        problems.push(format!("info.{field} must be a string"));
                    }
                }
            }
            _ => problems.push("missing info object".to_string()),
        }

        match document.get("paths").and_then(Value::as_object) {
            Some(paths) => {
                for path in paths.keys().filter(|p| !p.starts_with('/')) {
                    problems.push(format!("path '{path}' must start with '/'"));
                }
            }
            None => problems.push("missing paths object".to_string()),
        }

        problems
    }
}

/// Loads the document and runs the linter over it.
pub(crate) async fn load_document(
    loader: &dyn ContractLoader,
    linter: Option<&dyn ContractLinter>,
) -> DispatchResult<Value> {
    let document = loader.load().await?;
    if let Some(linter) = linter {
        let problems = linter.lint(&document);
        if !problems.is_empty() {
            return Err(DispatchError::Lint(problems.join("; ")));
        }
    }
    Ok(document)
}
