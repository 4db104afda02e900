//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async production code MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, `tokio::io`, `tokio::net` and async `reqwest`.
//! **Acceptable**: blocking calls in plain functions that run before the
//! event loop (configuration loading, argument parsing) and test code.

use architectural_enforcement::{
    assert_no_violations, code_part, enclosing_fn, is_in_test_code, production_sources,
    Violation,
};

/// Patterns that block a runtime worker thread
const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::io::stdout()", "Blocking stdout"),
    ("std::thread::sleep", "Blocking sleep"),
];

#[test]
fn test_no_blocking_io_in_async_code() {
    let mut violations = Vec::new();

    for file in production_sources() {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            let Some((_, reason)) = BLOCKING_PATTERNS
                .iter()
                .find(|(pattern, _)| code.contains(pattern))
            else {
                continue;
            };
            if is_in_test_code(&lines, idx) || !in_async_context(&lines, idx) {
                continue;
            }
            violations.push(Violation {
                path: file.path.clone(),
                line: idx + 1,
                text: line.trim().to_string(),
                reason,
            });
        }
    }

    assert_no_violations("blocking I/O", &violations);
}

#[test]
fn test_no_blocking_imports() {
    let mut violations = Vec::new();

    for file in production_sources() {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line).trim();
            let blocking_import = code.starts_with("use std::fs")
                || code.starts_with("use std::net")
                || code.starts_with("use reqwest::blocking");
            if blocking_import && !is_in_test_code(&lines, idx) {
                violations.push(Violation {
                    path: file.path.clone(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                    reason: "Blocking module imported",
                });
            }
        }
    }

    assert_no_violations("blocking import", &violations);
}

/// Whether the line runs on the async runtime
///
/// Lines inside `async` blocks of plain functions count as async too.
fn in_async_context(lines: &[&str], current_idx: usize) -> bool {
    let Some(found) = enclosing_fn(lines, current_idx) else {
        return false;
    };
    if found.is_async {
        return true;
    }
    lines[..=current_idx]
        .iter()
        .rev()
        .take_while(|line| !code_part(line).contains(&format!("fn {}", found.name)))
        .any(|line| code_part(line).contains("async move") || code_part(line).contains("async {"))
}

#[test]
fn test_blocking_call_in_async_fn_detected() {
    let code = vec![
        "async fn load() {",
        "    let contents = std::fs::read_to_string(\"abi.json\");",
        "}",
    ];
    assert!(in_async_context(&code, 1));
}

#[test]
fn test_blocking_call_before_runtime_allowed() {
    let code = vec![
        "fn load_config_with_env(path: Option<PathBuf>) -> Result<PanelConfig, ConfigError> {",
        "    let contents = std::fs::read_to_string(path);",
        "}",
    ];
    assert!(!in_async_context(&code, 1));
}

#[test]
fn test_blocking_call_in_spawned_block_detected() {
    let code = vec![
        "pub fn spawn_reader() -> JoinHandle<()> {",
        "    tokio::spawn(async move {",
        "        let line = std::io::stdin().read_line(&mut buf);",
        "    })",
        "}",
    ];
    assert!(in_async_context(&code, 2));
}
