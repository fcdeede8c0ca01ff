//! Assembles and executes one analyzer invocation: ask clang for its
//! internal `-cc1` command line via `-###`, then run it with the checker
//! plugin arguments appended.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Result, ScanError};
use crate::filters::ArgInfo;

use super::params::AnalyzerParams;
use super::shellsplit;

/// Builds the argument list described by the analyzer invocation grammar:
/// fixed analysis flags, the driver's own `-Xclang`-wrapped checker
/// options, plugin-arg pairs for the report/ast paths, optional CTU
/// plugin-arg pairs, then the original arch/lang/compiler-option/source
/// tail.
pub fn build_driver_args(
    params: &AnalyzerParams,
    arginfo: &ArgInfo,
    lang: &str,
    source: &str,
    report_path: &Path,
    ast_dir: &Path,
    indexfile: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "-fsyntax-only".to_string(),
        "-fparse-all-comments".to_string(),
        "-fno-trigraphs".to_string(),
    ];
    args.extend(params.analysis_args.iter().cloned());

    args.extend(plugin_arg(&format!("-o={}", report_path.display())));
    args.extend(plugin_arg(&format!("-astdir={}", ast_dir.display())));

    if let Some(indexfile) = indexfile {
        args.extend(plugin_arg("-ctu=true"));
        args.extend(plugin_arg(&format!("-index={indexfile}")));
    }

    for arch in &arginfo.archs {
        args.push("-arch".to_string());
        args.push(arch.clone());
    }
    args.push("-x".to_string());
    args.push(lang.to_string());
    args.extend(arginfo.options.iter().cloned());
    args.push(source.to_string());

    args
}

fn plugin_arg(value: &str) -> [String; 4] {
    [
        "-Xclang".to_string(),
        "-plugin-arg-Misra-Checker".to_string(),
        "-Xclang".to_string(),
        value.to_string(),
    ]
}

/// Asks `clang -### <driver_args>` for the actual `-cc1` invocation and
/// parses the last output line into argv.
pub fn resolve_cc1_invocation(params: &AnalyzerParams, driver_args: &[String]) -> Result<Vec<String>> {
    let output = Command::new(&params.clang)
        .arg("-###")
        .args(driver_args)
        .output()
        .map_err(|e| ScanError::io(&params.clang, e))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let last_line = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();

    Ok(shellsplit::split(last_line))
}

/// Runs the resolved `-cc1` invocation, returning its captured output.
pub fn run_cc1(clang: &Path, cc1_args: &[String]) -> Result<Output> {
    Command::new(clang)
        .args(cc1_args)
        .output()
        .map_err(|e| ScanError::io(clang, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AnalyzerParams {
        AnalyzerParams {
            clang: "clang".into(),
            analysis_args: vec!["-Xclang".to_string(), "-analyzer-checker=core".to_string()],
            output_dir: "/tmp/out".into(),
            output_format: "json".to_string(),
            output_failures: false,
            project_root: "/tmp/proj".into(),
            ctu_mode: false,
            resource_graph_path: None,
        }
    }

    #[test]
    fn non_ctu_build_omits_ctu_plugin_args() {
        let arginfo = ArgInfo { options: vec!["-Wno-unused".to_string()], ..Default::default() };
        let args = build_driver_args(
            &params(),
            &arginfo,
            "c",
            "a.c",
            Path::new("/tmp/out/a.json"),
            Path::new("/tmp/out/ast"),
            None,
        );
        assert!(!args.iter().any(|a| a.contains("ctu=true")));
        assert_eq!(args.last(), Some(&"a.c".to_string()));
    }

    #[test]
    fn ctu_build_includes_index_plugin_arg() {
        let arginfo = ArgInfo::default();
        let args = build_driver_args(
            &params(),
            &arginfo,
            "c",
            "a.c",
            Path::new("/tmp/out/a.json"),
            Path::new("/tmp/out/ast"),
            Some("/tmp/out/ast/lib.a.index"),
        );
        assert!(args.iter().any(|a| a.contains("ctu=true")));
        assert!(args.iter().any(|a| a.contains("index=/tmp/out/ast/lib.a.index")));
    }

    #[test]
    fn archs_are_prepended_before_lang_flag() {
        let arginfo = ArgInfo { archs: vec!["x86_64".to_string()], ..Default::default() };
        let args = build_driver_args(
            &params(),
            &arginfo,
            "c",
            "a.c",
            Path::new("/tmp/out/a.json"),
            Path::new("/tmp/out/ast"),
            None,
        );
        let arch_pos = args.iter().position(|a| a == "-arch").unwrap();
        let lang_pos = args.iter().position(|a| a == "-x").unwrap();
        assert!(arch_pos < lang_pos);
    }
}
