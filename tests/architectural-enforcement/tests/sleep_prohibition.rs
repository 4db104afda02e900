//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. Waiting happens on I/O,
//! channels and join handles.
//! **Exceptions**: the deferred status refresh (a fixed settle delay before
//! re-reading chain state), periodic tasks driven by `tokio::time::interval`,
//! and test code.

use architectural_enforcement::{
    assert_no_violations, code_part, enclosing_fn, is_in_test_code, production_sources,
    Violation,
};

/// Functions allowed to wait for a fixed delay
const DEFERRED_REFRESH_FNS: &[&str] = &["refresh_after"];

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for file in production_sources() {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            if !(code.contains("::sleep(") || code.contains(".sleep(")) {
                continue;
            }
            if is_in_test_code(&lines, idx) || is_interval_pattern(&lines, idx) {
                continue;
            }
            if enclosing_fn(&lines, idx).is_some_and(|f| DEFERRED_REFRESH_FNS.contains(&f.name)) {
                continue;
            }
            violations.push(Violation {
                path: file.path.clone(),
                line: idx + 1,
                text: line.trim().to_string(),
                reason: "Sleep call",
            });
        }
    }

    assert_no_violations("sleep", &violations);
}

/// Whether the sleep sits in a loop driven by `tokio::time::interval`
fn is_interval_pattern(lines: &[&str], current_idx: usize) -> bool {
    let start = current_idx.saturating_sub(20);
    let end = (current_idx + 5).min(lines.len());
    lines[start..end]
        .iter()
        .any(|line| line.contains("interval.tick()") || line.contains("tokio::time::interval"))
}

#[test]
fn test_sleep_outside_allowed_fn_detected() {
    let code = vec![
        "    async fn poll_receipt(&self) {",
        "        loop {",
        "            tokio::time::sleep(Duration::from_secs(1)).await;",
        "        }",
        "    }",
    ];
    let found = enclosing_fn(&code, 2).expect("function");
    assert!(!DEFERRED_REFRESH_FNS.contains(&found.name));
    assert!(!is_interval_pattern(&code, 2));
}

#[test]
fn test_interval_detection() {
    let code = vec![
        "    let mut interval = tokio::time::interval(poll);",
        "    loop {",
        "        interval.tick().await;",
        "    }",
    ];
    assert!(is_interval_pattern(&code, 2));
}
