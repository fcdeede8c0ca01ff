//! Build-interception and cross-translation-unit analysis driver for C/C++
//! projects: traces a build, classifies each compile/archive invocation,
//! reconstructs the dependency graph between sources and artifacts, and
//! dispatches a fake-compiler wrapper through a single-TU then a
//! cross-translation-unit analysis pass.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod fakecc;
pub mod filters;
pub mod graph;
pub mod linker;
pub mod logging;
pub mod orchestrator;
pub mod trace;
pub mod util;

pub use error::{Result, ScanError};
