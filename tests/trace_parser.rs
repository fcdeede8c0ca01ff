use std::io::Write;

use tuscan::trace::for_each_successful_execve;

#[test]
fn single_line_execve_yields_one_call() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        r#"1234  execve("/usr/bin/gcc", ["gcc", "-c", "a.c", "-o", "a.o"], ["PWD=/tmp/p"]) = 0"#
    )
    .unwrap();
    f.flush().unwrap();

    let mut seen = Vec::new();
    for_each_successful_execve(f.path(), |call| seen.push(call)).unwrap();

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].filename, "/usr/bin/gcc");
    assert_eq!(seen[0].argv, vec!["gcc", "-c", "a.c", "-o", "a.o"]);
    assert_eq!(seen[0].envp, vec!["PWD=/tmp/p"]);
}

#[test]
fn unfinished_and_resumed_lines_join_into_one_call() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        r#"55  execve("/bin/b", ["b", "arg"], ["PWD=/x"] <unfinished ...>"#
    )
    .unwrap();
    writeln!(f, "2  some other syscall() = 0").unwrap();
    writeln!(f, "55  <... execve resumed> ) = 0").unwrap();
    f.flush().unwrap();

    let mut seen = Vec::new();
    for_each_successful_execve(f.path(), |call| seen.push(call)).unwrap();

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].filename, "/bin/b");
}

#[test]
fn failed_execve_is_not_yielded() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, r#"1  execve("/bin/x", ["x"], []) = -1"#).unwrap();
    f.flush().unwrap();

    let mut seen = Vec::new();
    for_each_successful_execve(f.path(), |call| seen.push(call)).unwrap();

    assert!(seen.is_empty());
}

#[test]
fn empty_trace_log_yields_nothing() {
    let f = tempfile::NamedTempFile::new().unwrap();
    let mut seen = Vec::new();
    for_each_successful_execve(f.path(), |call| seen.push(call)).unwrap();
    assert!(seen.is_empty());
}
