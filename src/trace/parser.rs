//! Line-oriented parser over a `strace -f -v execve` log.

use std::collections::HashMap;

use super::lexer;

/// One successfully-parsed `execve` call, prior to classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecveCall {
    pub filename: String,
    pub argv: Vec<String>,
    pub envp: Vec<String>,
}

/// The outcome of parsing a single line.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine {
    /// Exit marker, unfinished call (stashed in `pending`), or a completed
    /// call whose exit status the caller doesn't need to inspect further
    /// because it wasn't `execve`, or wasn't a zero exit.
    Skip,
    /// A completed `execve` call (either fully on one line, or joined from
    /// an `<unfinished ...>` / `<... execve resumed>` pair) with its exit
    /// status.
    Exec { call: ExecveCall, status: i32 },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TraceParseError {
    #[error("line does not start with a PID")]
    MissingPid,
    #[error("line has no content after the PID")]
    EmptyAfterPid,
    #[error("expected 'resumed>' in a resumed-call line")]
    MissingResumedKeyword,
    #[error("syscall in line is not execve")]
    NotExecve,
    #[error("malformed execve argument list")]
    MalformedArguments,
    #[error("malformed exit status")]
    MalformedStatus,
    #[error("resumed call for pid {0} has no matching pending entry")]
    UnmatchedResume(i64),
}

/// Parses one trace log line at a time, threading pending (unfinished)
/// calls through `pending` so a later `<... execve resumed>` line can be
/// joined back up. Safe to reuse across an entire log file.
#[derive(Default)]
pub struct TraceParser {
    pending: HashMap<i64, ExecveCall>,
}

impl TraceParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unfinished calls currently awaiting a resume line. Exposed
    /// so tests can assert this doesn't grow without bound.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn parse_line(&mut self, line: &str) -> Result<ParsedLine, TraceParseError> {
        let (pid, rest) = lexer::read_int(line).ok_or(TraceParseError::MissingPid)?;
        let rest = lexer::skip_blanks(rest);
        if rest.is_empty() {
            return Err(TraceParseError::EmptyAfterPid);
        }

        let mut chars = rest.chars();
        let next_char = chars.next().unwrap();

        if next_char == '+' {
            return Ok(ParsedLine::Skip);
        }

        if next_char == '<' {
            let after = lexer::read_resumed_keyword(rest)
                .ok_or(TraceParseError::MissingResumedKeyword)?;
            let call = self.pending.remove(&pid).ok_or(TraceParseError::UnmatchedResume(pid))?;
            return self.finish_call(after, call);
        }

        let (syscall, after) =
            lexer::read_until(rest, "(", true).ok_or(TraceParseError::MalformedArguments)?;
        if syscall.trim() != "execve" {
            return Err(TraceParseError::NotExecve);
        }

        let (call, after) = Self::parse_execve_arguments(after)?;

        match lexer::read_char(after, ')') {
            Some(after_close) => self.finish_call(after_close, call),
            None => {
                self.pending.insert(pid, call);
                Ok(ParsedLine::Skip)
            }
        }
    }

    fn parse_execve_arguments(line: &str) -> Result<(ExecveCall, &str), TraceParseError> {
        let (filename, line) = lexer::read_string(line).ok_or(TraceParseError::MalformedArguments)?;
        let line = lexer::read_char(line, ',').ok_or(TraceParseError::MalformedArguments)?;
        let (argv, line) = Self::parse_string_array(line)?;
        let line = lexer::read_char(line, ',').ok_or(TraceParseError::MalformedArguments)?;
        let (envp, line) = Self::parse_string_array(line)?;
        Ok((ExecveCall { filename, argv, envp }, line))
    }

    fn parse_string_array(line: &str) -> Result<(Vec<String>, &str), TraceParseError> {
        let mut line = lexer::read_char(line, '[').ok_or(TraceParseError::MalformedArguments)?;
        let mut out = Vec::new();

        if let Some((s, rest)) = lexer::read_string(line) {
            out.push(s);
            line = rest;
            while let Some(rest) = lexer::read_char(line, ',') {
                let (s, rest) = lexer::read_string(rest).ok_or(TraceParseError::MalformedArguments)?;
                out.push(s);
                line = rest;
            }
        }

        let line = lexer::read_char(line, ']').ok_or(TraceParseError::MalformedArguments)?;
        Ok((out, line))
    }

    /// Parses the tail shared by a completed call and a resumed call:
    /// `= <status>`.
    fn finish_call<'a>(
        &mut self,
        line: &'a str,
        call: ExecveCall,
    ) -> Result<ParsedLine, TraceParseError> {
        let (_, line) =
            lexer::read_until(line, "=", false).ok_or(TraceParseError::MalformedStatus)?;
        let (status, _) = lexer::read_int(line).ok_or(TraceParseError::MalformedStatus)?;
        Ok(ParsedLine::Exec { call, status: status as i32 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_successful_execve() {
        let mut p = TraceParser::new();
        let line = r#"1234  execve("/usr/bin/gcc", ["gcc", "-c", "a.c", "-o", "a.o"], ["PWD=/tmp/p"]) = 0"#;
        let parsed = p.parse_line(line).unwrap();
        match parsed {
            ParsedLine::Exec { call, status } => {
                assert_eq!(status, 0);
                assert_eq!(call.filename, "/usr/bin/gcc");
                assert_eq!(call.argv, vec!["gcc", "-c", "a.c", "-o", "a.o"]);
                assert_eq!(call.envp, vec!["PWD=/tmp/p"]);
            }
            other => panic!("expected Exec, got {other:?}"),
        }
        assert_eq!(p.pending_len(), 0);
    }

    #[test]
    fn exit_marker_is_skipped() {
        let mut p = TraceParser::new();
        let parsed = p.parse_line("4321  +++ exited with 0 +++").unwrap();
        assert_eq!(parsed, ParsedLine::Skip);
    }

    #[test]
    fn unfinished_then_resumed_join_into_one_call() {
        let mut p = TraceParser::new();
        let unfinished =
            r#"55  execve("/bin/b", ["b", "arg"], ["PWD=/x"] <unfinished ...>"#;
        let parsed = p.parse_line(unfinished).unwrap();
        assert_eq!(parsed, ParsedLine::Skip);
        assert_eq!(p.pending_len(), 1);

        let resumed = "55  <... execve resumed> ) = 0";
        let parsed = p.parse_line(resumed).unwrap();
        match parsed {
            ParsedLine::Exec { call, status } => {
                assert_eq!(status, 0);
                assert_eq!(call.filename, "/bin/b");
            }
            other => panic!("expected Exec, got {other:?}"),
        }
        assert_eq!(p.pending_len(), 0);
    }

    #[test]
    fn non_execve_syscall_errors() {
        let mut p = TraceParser::new();
        let err = p.parse_line(r#"1  openat("x") = 3"#).unwrap_err();
        assert_eq!(err, TraceParseError::NotExecve);
    }

    #[test]
    fn failed_exec_is_still_reported_with_nonzero_status() {
        let mut p = TraceParser::new();
        let line = r#"7  execve("/bin/x", ["x"], []) = -1"#;
        match p.parse_line(line).unwrap() {
            ParsedLine::Exec { status, .. } => assert_eq!(status, -1),
            other => panic!("expected Exec, got {other:?}"),
        }
    }

    #[test]
    fn resumed_without_pending_errors_but_does_not_panic() {
        let mut p = TraceParser::new();
        let err = p.parse_line("9  <... execve resumed> ) = 0").unwrap_err();
        assert_eq!(err, TraceParseError::UnmatchedResume(9));
    }
}
