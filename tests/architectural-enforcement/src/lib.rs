//! Architectural Enforcement Helpers
//!
//! Source scanning shared by the policy tests in `tests/`:
//! - No sleeping in production code outside the deferred status refresh
//! - No blocking I/O inside async functions
//! - No process-wide mutable state (sessions live in the event loop)
//! - No presentation concerns in the core crate
//!
//! The scanners are line based and rely on the
//! workspace convention that a file's `#[cfg(test)]` module comes last.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Production source trees checked by every policy
pub const PRODUCTION_DIRS: &[&str] = &["panel/core/src", "panel/cli/src"];

/// Source tree of the presentation-free core
pub const CORE_DIR: &str = "panel/core";

/// Workspace root, independent of the directory tests run from
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from("../.."))
}

/// A loaded Rust source file
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// File contents
    pub content: String,
}

impl SourceFile {
    /// Lines of the file
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.content.lines().collect()
    }
}

/// Load every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn sources_in(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let base = root.join(dir);
    if !base.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(&base)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|entry| {
            let content = fs::read_to_string(entry.path()).ok()?;
            let path = entry
                .path()
                .strip_prefix(&root)
                .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf);
            Some(SourceFile { path, content })
        })
        .collect()
}

/// Load every production source file
#[must_use]
pub fn production_sources() -> Vec<SourceFile> {
    PRODUCTION_DIRS.iter().flat_map(|dir| sources_in(dir)).collect()
}

/// A line breaking a policy
#[derive(Debug)]
pub struct Violation {
    /// File
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Offending line, trimmed
    pub text: String,
    /// What is wrong with it
    pub reason: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.reason,
            self.text
        )
    }
}

/// Panic listing every violation, if there are any
pub fn assert_no_violations(policy: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!(
        "\nFound {} {policy} violation(s) in production code.",
        violations.len()
    );
}

/// Code portion of a line, without a trailing `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether the line lies inside the file's test module
#[must_use]
pub fn is_in_test_code(lines: &[&str], current_idx: usize) -> bool {
    lines[..=current_idx]
        .iter()
        .any(|line| line.trim().starts_with("#[cfg(test)]"))
}

/// A function declaration found above a line
#[derive(Debug, PartialEq, Eq)]
pub struct EnclosingFn<'a> {
    /// Function name
    pub name: &'a str,
    /// Declared `async`
    pub is_async: bool,
}

/// The nearest function declared above `current_idx`
///
/// Closures and async blocks are not functions; a line inside one reports the
/// function that contains it.
#[must_use]
pub fn enclosing_fn<'a>(lines: &[&'a str], current_idx: usize) -> Option<EnclosingFn<'a>> {
    for line in lines[..=current_idx].iter().rev() {
        let code = code_part(line).trim();
        if let Some(found) = parse_fn_decl(code) {
            return Some(found);
        }
        if code.starts_with("impl ") || code.starts_with("mod ") {
            return None;
        }
    }
    None
}

fn parse_fn_decl(code: &str) -> Option<EnclosingFn<'_>> {
    let mut rest = code;
    for prefix in ["pub(crate) ", "pub(super) ", "pub "] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }
    let is_async = rest.starts_with("async ");
    rest = rest.strip_prefix("async ").unwrap_or(rest);
    let rest = rest.strip_prefix("fn ")?;
    let end = rest.find(|c: char| c == '(' || c == '<')?;
    Some(EnclosingFn {
        name: &rest[..end],
        is_async,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing_fn_skips_blocks() {
        let code = vec![
            "    pub fn refresh_after(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {",
            "        tokio::spawn(async move {",
            "            tokio::time::sleep(delay).await;",
            "        })",
        ];
        assert_eq!(
            enclosing_fn(&code, 2),
            Some(EnclosingFn {
                name: "refresh_after",
                is_async: false
            })
        );
    }

    #[test]
    fn test_enclosing_async_fn() {
        let code = vec![
            "    pub async fn connect(&self) -> Option<Session<P>> {",
            "        let x = 1;",
        ];
        let found = enclosing_fn(&code, 1).expect("function");
        assert_eq!(found.name, "connect");
        assert!(found.is_async);
    }

    #[test]
    fn test_impl_boundary_stops_search() {
        let code = vec!["impl Foo {", "    const X: u8 = 1;"];
        assert_eq!(enclosing_fn(&code, 1), None);
    }

    #[test]
    fn test_test_module_detection() {
        let code = vec!["fn a() {}", "#[cfg(test)]", "mod tests {", "    fn b() {}"];
        assert!(!is_in_test_code(&code, 0));
        assert!(is_in_test_code(&code, 3));
    }

    #[test]
    fn test_comment_stripped() {
        assert_eq!(code_part("let a = 1; // std::fs::read"), "let a = 1; ");
    }

    #[test]
    fn test_production_sources_found() {
        assert!(
            !production_sources().is_empty(),
            "workspace root resolved to {}",
            workspace_root().display()
        );
    }
}
