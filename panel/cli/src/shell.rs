//! Interactive shell
//!
//! Reads commands from stdin and forwards them to a running
//! [`ControlPanel`](guardpanel_core::ControlPanel). Actions run concurrently:
//! a slow deposit does not block a freeze typed right after it.
//!
//! ```text
//! > connect
//! > deposit 2.5
//! > transfer 0x1234...abcd 1
//! > status
//! > quit
//! ```

use std::fmt::Write;

use guardpanel_core::{Action, FormInputs, PanelHandle};
use tokio::io::{AsyncBufReadExt, BufReader};

/// A parsed shell line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Connect or reconnect the wallet
    Connect,
    /// Refresh the account status
    Status,
    /// Run an action with positional field values
    Submit(Action, FormInputs),
    /// Print usage
    Help,
    /// Leave the shell
    Quit,
    /// Blank line
    Empty,
}

/// Parse one line of input
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let args: Vec<&str> = words.collect();

    let no_args = |cmd: ShellCommand| {
        if args.is_empty() {
            Ok(cmd)
        } else {
            Err(format!("'{command}' takes no arguments"))
        }
    };

    match command {
        "connect" => no_args(ShellCommand::Connect),
        "status" | "refresh" => no_args(ShellCommand::Status),
        "help" | "?" => no_args(ShellCommand::Help),
        "quit" | "exit" => no_args(ShellCommand::Quit),
        name => {
            let action = Action::from_command_name(name)
                .ok_or_else(|| format!("Unknown command '{name}'. Type 'help' for a list."))?;
            let fields = action.fields();
            if args.len() > fields.len() {
                return Err(usage(action));
            }
            // Missing values read as empty and are rejected by validation
            let inputs = fields
                .iter()
                .zip(args)
                .fold(FormInputs::new(), |inputs, (spec, value)| {
                    inputs.with(spec.field, value)
                });
            Ok(ShellCommand::Submit(action, inputs))
        }
    }
}

fn usage(action: Action) -> String {
    let mut line = format!("usage: {}", action.command_name());
    for spec in action.fields() {
        let _ = write!(line, " <{}>", spec.field.label());
    }
    line
}

fn help_text() -> String {
    let mut lines = vec![
        "Commands:".to_string(),
        "  connect".to_string(),
        "  status".to_string(),
    ];
    lines.extend(
        Action::ALL
            .iter()
            .map(|action| format!("  {}", &usage(*action)["usage: ".len()..])),
    );
    lines.push("  quit".to_string());
    lines.join("\n")
}

/// Read commands until `quit`, end of input or Ctrl-C
pub async fn run(handle: PanelHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    handle.connect().await?;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        match parse_line(&line) {
            Ok(ShellCommand::Connect) => handle.connect().await?,
            Ok(ShellCommand::Status) => handle.refresh_status().await?,
            Ok(ShellCommand::Submit(action, inputs)) => handle.submit(action, inputs).await?,
            Ok(ShellCommand::Help) => eprintln!("{}", help_text()),
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Empty) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    handle.shutdown().await
}
