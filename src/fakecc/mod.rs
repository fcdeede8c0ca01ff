//! The fake compiler: substituted for `cc`/`c++` in the build environment
//! by the orchestrator, it classifies its own argv, drives the real
//! analyzer once per (source, CTU target) pair, and records successes and
//! failures to disk. Shared by the `tuscan-cc` and `tuscan-cxx` binaries,
//! parameterized by `Mode` rather than sniffing its own basename at
//! runtime.

mod command;
mod lang;
mod params;
mod shellsplit;

use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{Result, ScanError};
use crate::filters::{ArgInfo, CcFilter, CmdFilter};
use crate::graph::ResourceGraph;
use crate::util;

pub use params::AnalyzerParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Cc,
    Cxx,
}

/// Runs the fake-compiler contract for one intercepted invocation. Returns
/// an exit code; per-TU failures never propagate as an `Err` here, only
/// I/O failures setting up the report/failure directories do.
pub fn run(mode: Mode, argv: &[String]) -> Result<i32> {
    let params = AnalyzerParams::from_env();
    let filter = match mode {
        Mode::Cc => CcFilter::cc(),
        Mode::Cxx => CcFilter::cxx(),
    };
    let arginfo = filter.inspect(argv);

    if arginfo.is_empty() {
        return Ok(0);
    }

    let graph = if params.ctu_mode {
        match &params.resource_graph_path {
            Some(path) => Some(ResourceGraph::load(path)?),
            None => None,
        }
    } else {
        None
    };

    fs::create_dir_all(params.ast_dir()).map_err(|e| ScanError::io(params.ast_dir(), e))?;
    fs::create_dir_all(params.logs_dir()).map_err(|e| ScanError::io(params.logs_dir(), e))?;

    for source in &arginfo.inputs {
        analyze_source(mode, &params, &arginfo, source, graph.as_ref())?;
    }

    Ok(0)
}

fn analyze_source(
    mode: Mode,
    params: &AnalyzerParams,
    arginfo: &ArgInfo,
    source: &str,
    graph: Option<&ResourceGraph>,
) -> Result<()> {
    if !Path::new(source).is_file() {
        warn!(source, "input source does not exist at dispatch time; skipping");
        return Ok(());
    }

    let lang = arginfo.lang.clone().or_else(|| lang::infer(source, mode).map(str::to_string));
    let Some(lang) = lang else {
        warn!(source, "unknown source language; skipping");
        return Ok(());
    };

    let targets: Vec<Option<String>> = match graph {
        Some(graph) => {
            let pwd = std::env::current_dir().map_err(|e| ScanError::io(".", e))?;
            let relpath = util::project_relative_of(&params.project_root, &pwd, source);
            match graph.find(&relpath) {
                Some(id) => {
                    let targets = &graph.vertex(id).indexfile_targets;
                    targets.iter().cloned().map(Some).collect()
                }
                // A lookup miss auto-creates an empty vertex upstream, whose
                // `indexfile_targets` is always `[]` — zero dispatches, not
                // a single no-index one.
                None => vec![],
            }
        }
        None => vec![None],
    };

    for target in targets {
        dispatch_one(params, arginfo, &lang, source, target.as_deref())?;
    }

    Ok(())
}

fn dispatch_one(
    params: &AnalyzerParams,
    arginfo: &ArgInfo,
    lang: &str,
    source: &str,
    indexfile: Option<&str>,
) -> Result<()> {
    let stamp = timestamp_suffix();
    let report_path = params.output_dir.join(format!("report_{stamp}.{}", params.output_format));
    let ast_dir = params.ast_dir();

    let driver_args =
        command::build_driver_args(params, arginfo, lang, source, &report_path, &ast_dir, indexfile);
    let cc1_args = command::resolve_cc1_invocation(params, &driver_args)?;
    let output = command::run_cc1(&params.clang, &cc1_args)?;

    if output.status.success() {
        trace!(source, stamp = %stamp, "analyzer invocation succeeded");
        rewrite_report_paths(&report_path)?;
        write_command_log(params, source, &cc1_args, &stamp)?;
        return Ok(());
    }

    if params.output_failures {
        record_failure(params, source, &output, &stamp)?;
    }

    if let Some(signal) = output.status.signal() {
        warn!(source, signal, "analyzer crashed");
    } else {
        warn!(source, status = output.status.code(), "analyzer exited with an error");
    }

    Ok(())
}

fn rewrite_report_paths(report_path: &Path) -> Result<()> {
    if !report_path.is_file() {
        return Ok(());
    }
    let bytes = fs::read(report_path).map_err(|e| ScanError::io(report_path, e))?;
    let mut value: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(_) => return Ok(()),
    };
    rewrite_file_fields(&mut value);
    let rewritten = serde_json::to_vec_pretty(&value)?;
    fs::write(report_path, rewritten).map_err(|e| ScanError::io(report_path, e))?;
    Ok(())
}

fn rewrite_file_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(file)) = map.get_mut("file") {
                *file = util::real_or_lexical(Path::new(file)).to_string_lossy().into_owned();
            }
            for v in map.values_mut() {
                rewrite_file_fields(v);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_file_fields(item);
            }
        }
        _ => {}
    }
}

fn write_command_log(params: &AnalyzerParams, source: &str, cc1_args: &[String], stamp: &str) -> Result<()> {
    let log_path = params.logs_dir().join(format!("cmd_{stamp}.log.json"));
    let body = serde_json::json!({ "source": source, "cc1_args": cc1_args });
    fs::write(&log_path, serde_json::to_vec_pretty(&body)?).map_err(|e| ScanError::io(&log_path, e))
}

fn record_failure(
    params: &AnalyzerParams,
    source: &str,
    output: &std::process::Output,
    stamp: &str,
) -> Result<()> {
    let failures_dir = params.failures_dir();
    fs::create_dir_all(&failures_dir).map_err(|e| ScanError::io(&failures_dir, e))?;

    let kind = if output.status.signal().is_some() { "crash" } else { "other_error" };
    let info = serde_json::json!({
        "source": source,
        "kind": kind,
        "status": output.status.code(),
        "signal": output.status.signal(),
    });

    let info_path = failures_dir.join(format!("{stamp}.info.json"));
    let stderr_path = failures_dir.join(format!("{stamp}.stderr.txt"));
    fs::write(&info_path, serde_json::to_vec_pretty(&info)?).map_err(|e| ScanError::io(&info_path, e))?;
    fs::write(&stderr_path, &output.stderr).map_err(|e| ScanError::io(&stderr_path, e))?;
    Ok(())
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}{:06}_{}", now.as_secs(), now.subsec_micros(), std::process::id())
}
