//! Boundary to the code-execution engine.
//!
//! The engine itself (a Python-in-WASM runtime in the reference deployment)
//! is a black box behind [`CodeEngine`]. What this module owns is the
//! contract around it: dataset staging under every name user code might
//! reach for, verbatim stdout capture including partial output before a
//! failure, and serialized access to the engine's persistent interpreter
//! state.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Fixed fallback path every staged dataset is also reachable under.
pub const FALLBACK_DATASET_PATH: &str = "data.csv";

#[derive(Debug, Clone)]
pub struct Dataset {
    pub content: String,
    pub file_name: String,
}

impl Dataset {
    pub fn new(content: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
        }
    }
}

/// Raw outcome of one engine invocation. `stdout` holds everything captured
/// before a failure, never discarded; `error` is the uncaught exception's
/// textual message if one was raised.
#[derive(Debug, Clone, Default)]
pub struct EngineRun {
    pub stdout: String,
    pub error: Option<String>,
}

/// The execution engine boundary. Implementations keep interpreter state
/// (imported modules, global variables such as a fitted `model`) alive
/// across `run` calls within one engine instance; that persistence is relied
/// on by multi-cell notebooks.
#[async_trait]
pub trait CodeEngine: Send + Sync {
    /// Whether the engine has finished loading and can accept code.
    fn ready(&self) -> bool {
        true
    }

    /// Runs one block of code with the given files staged. Must never panic
    /// on bad user code; failures come back in [`EngineRun::error`].
    async fn run(&mut self, code: &str, files: &HashMap<String, String>) -> EngineRun;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub error: Option<String>,
}

/// Single-owner wrapper around one engine instance. The mutex is the whole
/// point: interpreter state is shared and mutable, so two runs must never
/// overlap. Callers still must not interleave runs they need ordered.
///
/// No timeout, memory cap, or cancellation is imposed on a run once started.
pub struct ExecutionAdapter<E> {
    engine: Mutex<E>,
}

impl<E: CodeEngine> ExecutionAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    pub async fn ready(&self) -> bool {
        self.engine.lock().await.ready()
    }

    /// Executes `code`, staging the dataset (when given) under its declared
    /// file name, a normalized alias, and the fixed fallback path, so code
    /// written against any of those conventions finds it.
    pub async fn execute(&self, code: &str, dataset: Option<&Dataset>) -> ExecutionResult {
        let mut files = HashMap::new();
        if let Some(ds) = dataset {
            files.insert(ds.file_name.clone(), ds.content.clone());
            files.insert(normalized_alias(&ds.file_name), ds.content.clone());
            files.insert(FALLBACK_DATASET_PATH.to_string(), ds.content.clone());
        }

        let mut engine = self.engine.lock().await;
        let run = engine.run(code, &files).await;
        ExecutionResult {
            success: run.error.is_none(),
            stdout: run.stdout,
            error: run.error,
        }
    }
}

fn normalized_alias(file_name: &str) -> String {
    file_name.trim().to_lowercase().replace(' ', "_")
}
