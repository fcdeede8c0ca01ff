//! Runs the tracer, classifies the resulting trace log, and dispatches the
//! two analyzer phases (single-TU then CTU) over a process pool.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use crate::analyzer::{self, CmdRecord};
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::filters::{self, CmdFilter};
use crate::graph::ResourceGraph;
use crate::linker;

pub struct ScanOutcome {
    pub records: usize,
    pub dispatched: usize,
}

/// Runs the full two-phase pipeline and returns a small summary for the
/// CLI to report.
pub fn run(config: &ScanConfig, tracer: &Path, project_root: &Path) -> Result<ScanOutcome> {
    let trace_log = config.output_dir.join("logs").join("strace.log");
    std::fs::create_dir_all(trace_log.parent().unwrap()).map_err(|e| ScanError::io(&trace_log, e))?;

    let trace_start = Instant::now();
    spawn_tracer(tracer, &trace_log, &config.build_cmd)?;
    info!(elapsed = ?trace_start.elapsed(), "traced build");

    let analyze_start = Instant::now();
    let registry = filters::default_registry();
    let records = analyzer::analyze(&trace_log, &registry, &config.output_dir.join("build_cmd.json"))?;
    info!(elapsed = ?analyze_start.elapsed(), count = records.len(), "classified build commands");

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .expect("thread pool parameters are always valid");

    let phase1_start = Instant::now();
    let dispatched = dispatch_phase(&pool, config, project_root, &records, None);
    info!(elapsed = ?phase1_start.elapsed(), dispatched, "phase 1 (single-TU) complete");

    let graph_start = Instant::now();
    let mut graph = ResourceGraph::from_records(&records, project_root);
    let ast_dir = config.output_dir.join("ast");
    linker::link(&mut graph, &ast_dir)?;
    let graph_path = ast_dir.join("resource_graph.obj");
    graph.save(&graph_path)?;
    info!(elapsed = ?graph_start.elapsed(), "built resource graph and linked indexes");

    let phase2_start = Instant::now();
    let dispatched2 = dispatch_phase(&pool, config, project_root, &records, Some(&graph_path));
    info!(elapsed = ?phase2_start.elapsed(), dispatched = dispatched2, "phase 2 (CTU) complete");

    Ok(ScanOutcome { records: records.len(), dispatched: dispatched + dispatched2 })
}

fn spawn_tracer(tracer: &Path, trace_log: &Path, build_cmd: &[String]) -> Result<()> {
    if build_cmd.is_empty() {
        return Ok(());
    }
    let status = Command::new(tracer)
        .args(["-e", "trace=execve", "-e", "signal=none", "-s", "65536", "-v", "-f", "-o"])
        .arg(trace_log)
        .args(build_cmd)
        .status()
        .map_err(|e| ScanError::io(tracer, e))?;

    if !status.success() {
        warn!(?status, "tracer's own exit status is non-zero; the traced build's status is not propagated");
    }
    Ok(())
}

/// Rewrites each record's `argv[0]` to the matching fake-compiler binary
/// and runs the rewritten invocation in its recorded `pwd`. Returns how
/// many invocations were actually dispatched (others were dropped: no
/// `pwd`, no matching fake-compiler, or empty `ArgInfo`).
fn dispatch_phase(
    pool: &rayon::ThreadPool,
    config: &ScanConfig,
    project_root: &Path,
    records: &[CmdRecord],
    graph_path: Option<&Path>,
) -> usize {
    use rayon::prelude::*;

    let invocations: Vec<&CmdRecord> = records
        .iter()
        .filter(|r| !r.arginfo.is_empty() && r.pwd.is_some())
        .collect();

    pool.install(|| {
        invocations
            .par_iter()
            .filter(|record| dispatch_one(config, project_root, record, graph_path))
            .count()
    })
}

fn dispatch_one(config: &ScanConfig, project_root: &Path, record: &CmdRecord, graph_path: Option<&Path>) -> bool {
    let Some(fakecc) = fake_compiler_for(config, &record.argv) else {
        return false;
    };
    let pwd = record.pwd.as_deref().unwrap_or(".");

    let mut cmd = Command::new(fakecc);
    cmd.args(&record.argv[1..]).current_dir(pwd);
    cmd.env("CLANG", &config.analyzer);
    cmd.env("CCC_ANALYZER_OUTPUT_DIR", &config.output_dir);
    cmd.env("CCC_ANALYZER_OUTPUT_FORMAT", "json");
    cmd.env("CCC_ANALYZER_PROJECT_ROOT", project_root);

    if let Some(graph_path) = graph_path {
        cmd.env("CCC_ANALYZER_CTUMODE", "yes");
        cmd.env("CCC_ANALYZER_RESOURCE_GRAPH_PATH", graph_path);
    }

    match cmd.status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!(?status, argv0 = %record.argv[0], "fake compiler invocation returned non-zero");
            true
        }
        Err(err) => {
            warn!(%err, argv0 = %record.argv[0], "failed to spawn fake compiler");
            false
        }
    }
}

fn fake_compiler_for(config: &ScanConfig, argv: &[String]) -> Option<PathBuf> {
    let argv0 = argv.first()?;
    let basename = argv0.rsplit('/').next().unwrap_or(argv0);
    let own_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();

    if filters::CcFilter::cxx().matches(basename) {
        return Some(own_dir.join("tuscan-cxx"));
    }
    if filters::CcFilter::cc().matches(basename) {
        return Some(own_dir.join("tuscan-cc"));
    }
    let _ = config;
    None
}
