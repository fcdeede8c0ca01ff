//! Single source of truth threaded through the orchestrator: output
//! directory, discovered analyzer path, worker count. Built once from CLI
//! args plus environment and then never mutated.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub output_dir: PathBuf,
    pub analyzer: PathBuf,
    pub workers: usize,
    pub keep_going: bool,
    pub status_bugs: bool,
    pub build_cmd: Vec<String>,
}

impl ScanConfig {
    /// Resolves the analyzer path, preferring an explicit override, and
    /// falling back to a `PATH` search.
    pub fn discover_analyzer(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return probe_analyzer_dir(path).ok_or_else(ScanError::analyzer_not_found);
        }
        which::which("clang").map_err(|_| ScanError::analyzer_not_found())
    }

    pub fn worker_count(override_count: Option<usize>) -> usize {
        override_count.unwrap_or_else(num_cpus::get)
    }
}

/// `--use-analyzer` may name the executable itself, a directory containing
/// `clang`, or a directory containing `bin/clang`.
fn probe_analyzer_dir(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let direct = path.join("clang");
    if direct.is_file() {
        return Some(direct);
    }
    let nested = path.join("bin").join("clang");
    if nested.is_file() {
        return Some(nested);
    }
    None
}
