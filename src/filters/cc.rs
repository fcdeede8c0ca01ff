use std::path::Path;

use super::pattern::{self, CC_PATTERNS, CXX_PATTERNS, SOURCE_EXTENSION, WARNING_NO_OPTION, WARNING_OPTION};
use super::{ArgInfo, CmdFilter};

const NOP_OPTIONS: &[&str] = &[
    "-E",
    "-M",
    "-MM",
    "-print-multiarch",
    "-v",
    "--print-prog-name",
    "--version",
    "-###",
];

const DISALLOWED_ARCHS: &[&str] = &["ppc", "ppc64"];

/// Shared CC/CXX argument decomposition; only the name-matching patterns
/// differ between the two instances.
pub struct CcFilter {
    patterns: &'static once_cell::sync::Lazy<Vec<regex::Regex>>,
}

impl CcFilter {
    pub fn cc() -> Self {
        Self { patterns: &CC_PATTERNS }
    }

    pub fn cxx() -> Self {
        Self { patterns: &CXX_PATTERNS }
    }
}

impl CmdFilter for CcFilter {
    fn matches(&self, argv0: &str) -> bool {
        pattern::matches_any(self.patterns, pattern::basename(argv0))
    }

    fn inspect(&self, argv: &[String]) -> ArgInfo {
        inspect_cc_argv(argv)
    }
}

fn inspect_cc_argv(argv: &[String]) -> ArgInfo {
    let mut info = ArgInfo::default();
    let mut output: Option<String> = None;
    let mut saw_arch = false;

    let mut iter = argv.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        if NOP_OPTIONS.contains(&arg.as_str()) {
            return ArgInfo::default();
        }

        if let Some((lhs, _)) = arg.split_once('=') {
            if lhs.is_empty() {
                continue;
            }
        }

        match arg.as_str() {
            "-arch" => {
                if let Some(value) = iter.next() {
                    info.archs.push(value.clone());
                    saw_arch = true;
                }
                continue;
            }
            "-x" => {
                if let Some(value) = iter.next() {
                    info.lang = Some(value.clone());
                }
                continue;
            }
            "-o" => {
                if let Some(value) = iter.next() {
                    output = Some(value.clone());
                }
                continue;
            }
            _ => {}
        }

        if SOURCE_EXTENSION.is_match(arg) {
            info.inputs.push(arg.clone());
            continue;
        }

        if WARNING_OPTION.is_match(arg) && !WARNING_NO_OPTION.is_match(arg) {
            continue;
        }

        info.options.push(arg.clone());
    }

    if saw_arch {
        info.archs.retain(|a| !DISALLOWED_ARCHS.contains(&a.as_str()));
        if info.archs.is_empty() {
            return ArgInfo::default();
        }
    }

    if info.inputs.is_empty() {
        return ArgInfo::default();
    }

    info.outputs = match output {
        Some(o) => vec![o],
        None if info.options.iter().any(|o| o == "-c") => info
            .inputs
            .iter()
            .map(|input| object_file_name(input))
            .collect(),
        None => vec!["a.out".to_string()],
    };

    info
}

fn object_file_name(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());
    format!("{stem}.o")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn basic_compile_with_explicit_output() {
        let info = inspect_cc_argv(&argv(&["gcc", "-c", "a.c", "-o", "a.o"]));
        assert_eq!(info.inputs, vec!["a.c"]);
        assert_eq!(info.outputs, vec!["a.o"]);
        assert_eq!(info.options, vec!["-c"]);
    }

    #[test]
    fn synthesizes_object_output_when_c_and_no_o() {
        let info = inspect_cc_argv(&argv(&["gcc", "-c", "foo.c"]));
        assert_eq!(info.outputs, vec!["foo.o"]);
    }

    #[test]
    fn defaults_to_a_out_without_c_or_o() {
        let info = inspect_cc_argv(&argv(&["gcc", "foo.c"]));
        assert_eq!(info.outputs, vec!["a.out"]);
    }

    #[test]
    fn nop_option_short_circuits_to_empty() {
        let info = inspect_cc_argv(&argv(&["gcc", "-E", "-o", "foo.i", "foo.c"]));
        assert!(info.is_empty());
    }

    #[test]
    fn disallowed_arch_alone_yields_empty() {
        let info = inspect_cc_argv(&argv(&["clang", "-arch", "ppc", "-c", "x.c"]));
        assert!(info.is_empty());
    }

    #[test]
    fn allowed_arch_survives_filtering() {
        let info = inspect_cc_argv(&argv(&["clang", "-arch", "ppc", "-arch", "x86_64", "-c", "x.c"]));
        assert_eq!(info.archs, vec!["x86_64"]);
    }

    #[test]
    fn warnings_are_dropped_except_wno() {
        let info = inspect_cc_argv(&argv(&["gcc", "-Wall", "-Wno-unused", "-c", "x.c"]));
        assert_eq!(info.options, vec!["-Wno-unused", "-c"]);
    }

    #[test]
    fn no_inputs_yields_empty() {
        let info = inspect_cc_argv(&argv(&["gcc", "-Wall", "-pthread"]));
        assert!(info.is_empty());
    }

    #[test]
    fn arch_and_lang_flags_are_consumed_as_two_tokens() {
        let info = inspect_cc_argv(&argv(&["clang", "-x", "c", "-c", "x.c"]));
        assert_eq!(info.lang, Some("c".to_string()));
    }
}
