//! Classifies a traced `argv` as a CC/CXX/AR invocation and decomposes it
//! into a semantic [`ArgInfo`].

mod ar;
mod cc;
mod pattern;

pub use ar::ArFilter;
pub use cc::CcFilter;

use serde::{Deserialize, Serialize};

/// Semantic decomposition of one compile/archive invocation. An `ArgInfo`
/// with empty `inputs` or empty `outputs` contributes no graph edges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgInfo {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub options: Vec<String>,
    pub lang: Option<String>,
    pub archs: Vec<String>,
}

impl ArgInfo {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// One classifier in the registry: recognizes a command by the basename of
/// `argv[0]` and knows how to decompose its arguments.
pub trait CmdFilter: Send + Sync {
    fn matches(&self, argv0: &str) -> bool;
    fn inspect(&self, argv: &[String]) -> ArgInfo;
}

/// Builds the default filter registry in a fixed, explicit order: CC, then
/// CXX, then AR. Order is significant — the first match wins.
pub fn default_registry() -> Vec<Box<dyn CmdFilter>> {
    vec![
        Box::new(CcFilter::cc()),
        Box::new(CcFilter::cxx()),
        Box::new(ArFilter),
    ]
}

/// Finds the first filter in `registry` whose pattern matches `argv0` and
/// runs it over `argv`. Returns `None` if nothing matches, mirroring the
/// "drop the tuple" behavior of the command analyzer.
pub fn classify(registry: &[Box<dyn CmdFilter>], argv: &[String]) -> Option<ArgInfo> {
    let argv0 = argv.first()?;
    registry
        .iter()
        .find(|f| f.matches(argv0))
        .map(|f| f.inspect(argv))
}
