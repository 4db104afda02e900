//! Integration Test: State Ownership
//!
//! **Policy**: The current session is owned by the control panel's event
//! loop and passed explicitly. Production code MUST NOT keep mutable state
//! in process-wide statics; atomics used for id generation are the only
//! statics allowed.
//!
//! **Policy**: The core is presentation-free. It reports through
//! `PanelMessage` and never prints or depends on terminal crates.

use std::fs;

use architectural_enforcement::{
    assert_no_violations, code_part, is_in_test_code, production_sources, sources_in,
    workspace_root, Violation, CORE_DIR,
};

/// Statics holding any of these are shared mutable state
const MUTABLE_STATIC_MARKERS: &[&str] = &[
    "Mutex",
    "RwLock",
    "RefCell",
    "OnceLock",
    "OnceCell",
    "LazyLock",
    "Session",
];

/// Crates that belong to presentation surfaces
const PRESENTATION_CRATES: &[&str] = &[
    "clap",
    "tracing-subscriber",
    "crossterm",
    "ratatui",
    "console",
    "indicatif",
];

#[test]
fn test_no_global_mutable_state() {
    let mut violations = Vec::new();

    for file in production_sources() {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line).trim();
            if is_in_test_code(&lines, idx) {
                continue;
            }
            let reason = if code.contains("static mut ") {
                Some("Mutable static")
            } else if code.contains("lazy_static!") || code.contains("thread_local!") {
                Some("Lazily initialized global")
            } else if is_static_item(code)
                && MUTABLE_STATIC_MARKERS.iter().any(|m| code.contains(m))
            {
                Some("Static with interior mutability")
            } else {
                None
            };
            if let Some(reason) = reason {
                violations.push(Violation {
                    path: file.path.clone(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                    reason,
                });
            }
        }
    }

    assert_no_violations("global state", &violations);
}

#[test]
fn test_core_does_not_print() {
    let mut violations = Vec::new();

    for file in sources_in(&format!("{CORE_DIR}/src")) {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            let prints = ["println!", "eprintln!", "print!(", "eprint!("]
                .iter()
                .any(|m| code.contains(m));
            if prints && !is_in_test_code(&lines, idx) {
                violations.push(Violation {
                    path: file.path.clone(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                    reason: "Core prints instead of sending a PanelMessage",
                });
            }
        }
    }

    assert_no_violations("presentation", &violations);
}

#[test]
fn test_core_has_no_presentation_dependencies() {
    let manifest_path = workspace_root().join(CORE_DIR).join("Cargo.toml");
    let manifest = fs::read_to_string(&manifest_path).expect("core manifest");

    let offending: Vec<&str> = manifest
        .lines()
        .map(|line| line.split('#').next().unwrap_or(line).trim())
        .filter_map(|line| line.split(['=', ' ', '.']).next())
        .filter(|name| PRESENTATION_CRATES.contains(name))
        .collect();

    assert!(
        offending.is_empty(),
        "core depends on presentation crates: {offending:?}"
    );
}

fn is_static_item(code: &str) -> bool {
    ["static ", "pub static ", "pub(crate) static "]
        .iter()
        .any(|prefix| code.starts_with(prefix))
}

#[test]
fn test_static_item_detection() {
    assert!(is_static_item("static CURRENT: Mutex<Option<Session>> = Mutex::new(None);"));
    assert!(is_static_item("pub static X: u8 = 1;"));
    assert!(!is_static_item("let statics = 1;"));
}
