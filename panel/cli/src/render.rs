//! Terminal rendering of panel messages
//!
//! Everything the core reports ends up here as plain lines on stdout.
//! Logs go to stderr, so piping the output stays clean.

use guardpanel_core::{Control, PanelMessage, StatusView};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;

/// Print messages until every sender is dropped
pub async fn run(mut rx: mpsc::Receiver<PanelMessage>) {
    let mut stdout = BufWriter::new(tokio::io::stdout());

    while let Some(msg) = rx.recv().await {
        let Some(text) = format_message(&msg) else {
            continue;
        };
        let written = async {
            stdout.write_all(text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        }
        .await;
        if let Err(e) = written {
            tracing::warn!("Failed to write to stdout: {}", e);
            break;
        }
    }
}

/// Text shown for a message, if it has a visible form
pub fn format_message(msg: &PanelMessage) -> Option<String> {
    match msg {
        PanelMessage::Notify { level, message } => Some(format!("[{}] {message}", level.tag())),
        PanelMessage::SessionEstablished {
            account_display,
            contract_display,
            ..
        } => Some(format!(
            "Account {account_display} connected to contract {contract_display}"
        )),
        PanelMessage::Status { view, .. } => Some(format_status(view)),
        PanelMessage::ControlBusy {
            control,
            busy: true,
        } => {
            tracing::debug!(control = control.element_id(), "{}", Control::BUSY_LABEL);
            None
        }
        PanelMessage::ControlBusy {
            control,
            busy: false,
        } => {
            tracing::debug!(control = control.element_id(), "Control idle");
            None
        }
        PanelMessage::ClearInputs { .. } => None,
        PanelMessage::InterfaceReady { functions } => {
            tracing::debug!(functions, "Contract interface loaded");
            None
        }
        // Already reported through a notification
        PanelMessage::InterfaceFailed { .. } => None,
    }
}

fn format_status(view: &StatusView) -> String {
    let rows = [
        ("Owner", &view.owner),
        ("Balance", &view.balance),
        ("Frozen", &view.frozen),
        ("Guardian", &view.guardian),
        ("Safe Mode", &view.safe_mode),
    ];
    rows.iter()
        .map(|(label, value)| format!("  {:<10} {value}", format!("{label}:")))
        .collect::<Vec<_>>()
        .join("\n")
}
