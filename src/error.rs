//! Crate-wide error taxonomy.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

/// Everything that can go wrong while tracing, classifying, graphing or
/// dispatching a build. Most variants are recorded and logged rather than
/// propagated -- see the module docs on [`crate::orchestrator`] for which
/// ones are fatal.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed trace log line: {0}")]
    TraceParse(String),

    #[error("record has {inputs} input(s) and {outputs} output(s): cannot derive graph edges")]
    RecordMismatch { inputs: usize, outputs: usize },

    #[error("resource graph contains a cycle; {visited} of {total} vertices were ordered")]
    GraphCycle { visited: usize, total: usize },

    #[error("analyzer crashed on {source} (signal, exit status {status})")]
    AnalyzerCrash { source: PathBuf, status: i32 },

    #[error("analyzer exited with status {status} on {source}")]
    AnalyzerFailed { source: PathBuf, status: i32 },

    #[error("input source {0} does not exist")]
    MissingSource(PathBuf),

    #[error("PWD not present in the traced environment for argv[0]={0}")]
    MissingPwd(String),

    #[error("vertex not found for path {0}")]
    VertexNotFound(PathBuf),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to (de)serialize the resource graph: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("no analyzer (clang) executable found on PATH; pass --use-analyzer")]
    AnalyzerNotFound,

    #[error("tracer executable not found on PATH: {0}")]
    TracerNotFound(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn analyzer_not_found() -> Self {
        Self::AnalyzerNotFound
    }
}
