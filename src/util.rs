//! Path helpers shared by the graph builder, virtual linker and fake
//! compiler: resolving traced paths against a working directory and
//! rendering them relative to the project root in a platform-independent
//! form.

use std::path::{Path, PathBuf};

use path_slash::PathExt as _;

/// Canonicalizes `path` if it exists on disk; otherwise returns it
/// unchanged (lexically), matching the "real path if it exists" rule.
pub fn real_or_lexical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Joins `raw` onto `pwd` unless it is already absolute.
pub fn resolve_against(pwd: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        pwd.join(candidate)
    }
}

/// Renders `absolute` relative to `project_root` using forward slashes
/// regardless of platform. Falls back to the absolute path (slash-form) if
/// it isn't actually under the root.
pub fn project_relative(project_root: &Path, absolute: &Path) -> String {
    let rel = absolute.strip_prefix(project_root).unwrap_or(absolute);
    rel.to_slash_lossy().into_owned()
}

/// Resolves a trace-relative path string all the way to a project-relative
/// identity: join against `pwd`, canonicalize if present on disk, then
/// relativize to `project_root`.
pub fn project_relative_of(project_root: &Path, pwd: &Path, raw: &str) -> String {
    let absolute = resolve_against(pwd, raw);
    let real = real_or_lexical(&absolute);
    project_relative(project_root, &real)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_path_against_pwd() {
        let pwd = Path::new("/tmp/project");
        let resolved = resolve_against(pwd, "a.c");
        assert_eq!(resolved, Path::new("/tmp/project/a.c"));
    }

    #[test]
    fn absolute_path_is_unchanged() {
        let pwd = Path::new("/tmp/project");
        let resolved = resolve_against(pwd, "/etc/x.c");
        assert_eq!(resolved, Path::new("/etc/x.c"));
    }

    #[test]
    fn project_relative_strips_root_and_uses_slashes() {
        let root = Path::new("/tmp/project");
        let abs = Path::new("/tmp/project/src/a.c");
        assert_eq!(project_relative(root, abs), "src/a.c");
    }
}
