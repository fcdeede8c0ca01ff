//! Drives the trace stream and filter registry to produce an ordered list
//! of [`CmdRecord`]s: one per successfully-traced compile/archive call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filters::{self, ArgInfo, CmdFilter};
use crate::trace;

/// One observed successful process: its full argument vector, the working
/// directory it ran in (recovered from the traced environment, never the
/// driver's own cwd), and the classified [`ArgInfo`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CmdRecord {
    pub argv: Vec<String>,
    pub pwd: Option<String>,
    pub arginfo: ArgInfo,
}

/// Streams `trace_log` through the trace parser and filter registry,
/// producing the ordered `CmdRecord` list and persisting a JSON mirror of
/// it at `out_json`.
pub fn analyze(
    trace_log: &Path,
    registry: &[Box<dyn CmdFilter>],
    out_json: &Path,
) -> Result<Vec<CmdRecord>> {
    let mut records = Vec::new();

    trace::for_each_successful_execve(trace_log, |call| {
        let Some(info) = filters::classify(registry, &call.argv) else {
            return;
        };
        let pwd = extract_pwd(&call.envp);
        tracing::trace!(argv0 = %call.argv.first().map(String::as_str).unwrap_or(""), "classified command");
        records.push(CmdRecord { argv: call.argv, pwd, arginfo: info });
    })
    .map_err(|e| crate::error::ScanError::io(trace_log, e))?;

    let json = serde_json::to_vec_pretty(&records)?;
    std::fs::write(out_json, json).map_err(|e| crate::error::ScanError::io(out_json, e))?;

    Ok(records)
}

/// Extracts the value of the first `PWD=` entry from a traced `envp`,
/// splitting only on the first `=`.
fn extract_pwd(envp: &[String]) -> Option<String> {
    envp.iter().find_map(|entry| {
        let (key, value) = entry.split_once('=')?;
        (key == "PWD").then(|| value.to_string())
    })
}
