use super::pattern::{self, AR_PATTERN};
use super::{ArgInfo, CmdFilter};

/// Archive (`ar`) invocations: the first filename-looking argument is the
/// output archive, the rest are member object files.
pub struct ArFilter;

impl CmdFilter for ArFilter {
    fn matches(&self, argv0: &str) -> bool {
        AR_PATTERN.is_match(pattern::basename(argv0))
    }

    fn inspect(&self, argv: &[String]) -> ArgInfo {
        let mut filenames = Vec::new();
        let mut iter = argv.iter().skip(1).peekable();

        while let Some(arg) = iter.next() {
            if arg == "--plugin" {
                iter.next();
                continue;
            }
            if arg.starts_with('-') {
                continue;
            }
            if arg.contains('.') {
                filenames.push(arg.clone());
            }
        }

        if filenames.len() < 2 {
            return ArgInfo::default();
        }

        let mut filenames = filenames.into_iter();
        let output = filenames.next().unwrap();
        ArgInfo {
            inputs: filenames.collect(),
            outputs: vec![output],
            ..Default::default()
        }
    }
}
