//! Turns a `strace -f -v -e trace=execve` log into an ordered stream of
//! successful `execve` calls.

mod lexer;
mod parser;

pub use parser::{ExecveCall, ParsedLine, TraceParseError, TraceParser};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Streams `path` line by line (never loading the whole file into memory)
/// and calls `on_success` for every successful (`status == 0`) `execve`.
/// Malformed lines are logged and skipped rather than aborting the scan.
pub fn for_each_successful_execve(
    path: &Path,
    mut on_success: impl FnMut(ExecveCall),
) -> std::io::Result<()> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut parser = TraceParser::new();

    for line in reader.lines() {
        let line = line?;
        match parser.parse_line(&line) {
            Ok(ParsedLine::Skip) => {}
            Ok(ParsedLine::Exec { call, status }) => {
                if status == 0 {
                    on_success(call);
                }
            }
            Err(err) => {
                warn!(%err, "skipping malformed trace log line");
            }
        }
    }

    Ok(())
}
