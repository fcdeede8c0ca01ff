//! Reads the `CCC_ANALYZER_*` environment the orchestrator sets before
//! dispatching a fake-compiler invocation.

use std::env;
use std::path::PathBuf;

/// One invocation's worth of analyzer configuration, read once from the
/// process environment.
pub struct AnalyzerParams {
    pub clang: PathBuf,
    pub analysis_args: Vec<String>,
    pub output_dir: PathBuf,
    pub output_format: String,
    pub output_failures: bool,
    pub project_root: PathBuf,
    pub ctu_mode: bool,
    pub resource_graph_path: Option<PathBuf>,
}

impl AnalyzerParams {
    pub fn from_env() -> Self {
        let analysis_args = env::var("CCC_ANALYZER_ANALYSIS")
            .unwrap_or_default()
            .split_whitespace()
            .flat_map(|tok| ["-Xclang".to_string(), tok.to_string()])
            .collect();

        Self {
            clang: env::var("CLANG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("clang")),
            analysis_args,
            output_dir: env::var("CCC_ANALYZER_OUTPUT_DIR").map(PathBuf::from).unwrap_or_default(),
            output_format: env::var("CCC_ANALYZER_OUTPUT_FORMAT").unwrap_or_else(|_| "json".to_string()),
            output_failures: env_bool("CCC_ANALYZER_OUTPUT_FAILURES"),
            project_root: env::var("CCC_ANALYZER_PROJECT_ROOT").map(PathBuf::from).unwrap_or_default(),
            ctu_mode: env_bool("CCC_ANALYZER_CTUMODE"),
            resource_graph_path: env::var("CCC_ANALYZER_RESOURCE_GRAPH_PATH").map(PathBuf::from).ok(),
        }
    }

    pub fn ast_dir(&self) -> PathBuf {
        self.output_dir.join("ast")
    }

    pub fn failures_dir(&self) -> PathBuf {
        self.output_dir.join("failures")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }
}

fn env_bool(name: &str) -> bool {
    matches!(env::var(name).as_deref(), Ok("yes") | Ok("1") | Ok("true"))
}
