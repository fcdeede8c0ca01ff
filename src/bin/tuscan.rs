//! CLI entry point: parses the orchestrator's arguments, resolves a
//! `ScanConfig`, and runs the two-phase scan.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use yansi::Paint;

use tuscan::config::ScanConfig;
use tuscan::{logging, orchestrator};

fn prefix() -> Paint<&'static str> {
    Paint::new("[tuscan]").bold()
}

#[derive(Parser, Debug)]
#[command(name = "tuscan", about = "Build-interception CTU analysis driver")]
struct Cli {
    /// Directory under which a timestamped report directory is created.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Override PATH-based discovery of the analyzer (clang).
    #[arg(long)]
    use_analyzer: Option<PathBuf>,

    /// Best-effort: rewrite a leading `make`/`gmake` build command to `make -k -i`.
    #[arg(short, long)]
    keep_going: bool,

    /// Exit non-zero if any translation unit produced a non-empty report.
    #[arg(long)]
    status_bugs: bool,

    /// Repeatable; raises tracing verbosity one notch per occurrence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Tracer executable (defaults to `strace` on PATH).
    #[arg(long, default_value = "strace")]
    tracer: String,

    /// The build command to intercept.
    #[arg(trailing_var_arg = true, required = true)]
    build_cmd: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let tracer_path =
        which::which(&cli.tracer).with_context(|| format!("tracer not found on PATH: {}", cli.tracer))?;
    let analyzer = ScanConfig::discover_analyzer(cli.use_analyzer.as_deref())
        .context("failed to discover an analyzer executable")?;

    let base_output = cli.output.unwrap_or_else(std::env::temp_dir);
    let output_dir = create_output_dir(&base_output)?;

    let build_cmd = rewrite_build_cmd(cli.build_cmd, cli.keep_going);

    let config = ScanConfig {
        output_dir,
        analyzer,
        workers: ScanConfig::worker_count(None),
        keep_going: cli.keep_going,
        status_bugs: cli.status_bugs,
        build_cmd,
    };

    let project_root = std::env::current_dir().context("failed to read current directory")?;

    let start = std::time::Instant::now();
    eprintln!("{} tracing and analyzing build...", prefix());
    let outcome = orchestrator::run(&config, &tracer_path, &project_root)?;
    eprintln!(
        "{} analyzed {} build command(s), dispatched {} invocation(s) ({:.2}s)",
        prefix(),
        outcome.records,
        outcome.dispatched,
        start.elapsed().as_secs_f64()
    );

    if config.status_bugs && any_nonempty_report(&config.output_dir)? {
        std::process::exit(1);
    }

    Ok(())
}

/// Mirrors `ScanBuildBase.createOutputDir`: a timestamped, PID-suffixed
/// subdirectory under `base`, created with a plain `mkdir` so a collision
/// (an unexpected symptom, not a retryable race) fails loudly.
fn create_output_dir(base: &std::path::Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(base).with_context(|| format!("creating {}", base.display()))?;
    let stamp = Local::now().format("%Y-%m-%d-%H%M%S-%f");
    let dir = base.join(format!("{stamp}-{}", std::process::id()));
    std::fs::create_dir(&dir).with_context(|| format!("output directory already exists: {}", dir.display()))?;
    Ok(dir)
}

fn rewrite_build_cmd(build_cmd: Vec<String>, keep_going: bool) -> Vec<String> {
    if !keep_going {
        return build_cmd;
    }
    match build_cmd.first().map(String::as_str) {
        Some("make") | Some("gmake") => {
            let mut rewritten = vec![build_cmd[0].clone(), "-k".to_string(), "-i".to_string()];
            rewritten.extend(build_cmd.into_iter().skip(1));
            rewritten
        }
        _ => build_cmd,
    }
}

fn any_nonempty_report(output_dir: &std::path::Path) -> anyhow::Result<bool> {
    for entry in std::fs::read_dir(output_dir).with_context(|| format!("reading {}", output_dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("report_") {
            continue;
        }
        let bytes = std::fs::read(entry.path())?;
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            continue;
        };
        if value.get("diagnostics").and_then(|d| d.as_array()).is_some_and(|a| !a.is_empty()) {
            return Ok(true);
        }
    }
    Ok(false)
}
