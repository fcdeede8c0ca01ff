//! Fake C++ compiler. Substituted for `c++`/`g++`/`clang++` by the
//! orchestrator; shares its implementation with `tuscan-cc` via
//! [`tuscan::fakecc`].

use tuscan::fakecc::{self, Mode};

fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    tuscan::logging::init(0);
    let code = fakecc::run(Mode::Cxx, &argv)?;
    std::process::exit(code);
}
