//! Regexes recognizing compiler/archiver names by the basename of `argv[0]`.

use once_cell::sync::Lazy;
use regex::Regex;

// Patterns reproduce the recognizer's own regexes verbatim (each keeps
// its leading `.*/?`), so a name that merely *ends* in the suffix also
// matches (e.g. "tar" against the AR pattern) — that looseness is
// inherited, not accidental.
fn anchored_tail(pattern: &str) -> Regex {
    Regex::new(&format!("^.*/?{pattern}$")).expect("static regex is valid")
}

pub static CC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        anchored_tail("cc"),
        anchored_tail("gcc[^/]*"),
        // `clang` must match, `clang++` must not: the negative lookahead
        // equivalent is expressed by excluding a trailing `++`.
        anchored_tail(r"clang(?:[^+/][^/]*)?"),
        anchored_tail("llvm-gcc[^/]*"),
    ]
});

pub static CXX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        anchored_tail(r"c\+\+"),
        anchored_tail(r"g\+\+[^/]*"),
        anchored_tail(r"clang\+\+[^/]*"),
        anchored_tail(r"llvm-g\+\+[^/]*"),
    ]
});

pub static AR_PATTERN: Lazy<Regex> = Lazy::new(|| anchored_tail("ar"));

pub static SOURCE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+\.c$|^.+\.cpp$").expect("static regex is valid"));

pub static WARNING_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-W.+$").unwrap());
pub static WARNING_NO_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-Wno-.+$").unwrap());

pub fn basename(cmd: &str) -> &str {
    cmd.rsplit('/').next().unwrap_or(cmd)
}

pub fn matches_any(patterns: &[Regex], cmd: &str) -> bool {
    patterns.iter().any(|re| re.is_match(cmd))
}
