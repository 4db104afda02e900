//! Guardpanel - Command-Line Control Panel for a Guarded Wallet
//!
//! Drives the guardpanel core from a terminal, either one action per
//! invocation or as an interactive shell.
//!
//! # Usage
//!
//! ```bash
//! # Show the account status
//! guardpanel status
//!
//! # Deposit 2.5 units, then print the refreshed status
//! guardpanel deposit 2.5
//!
//! # Point at another provider and contract
//! guardpanel --rpc-url http://127.0.0.1:8545 --contract 0x... unfreeze
//!
//! # Interactive shell
//! guardpanel shell
//!
//! # Verbose logging
//! RUST_LOG=debug guardpanel status
//! ```
//!
//! One-shot commands exit non-zero when the action does not complete.

mod render;
mod shell;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guardpanel_core::{
    load_config_from_path, Action, ConfigOverrides, ControlPanel, DispatchOutcome, Dispatcher,
    FormInputs, InputField, InterfaceSource, JsonRpcProvider, PanelConfig,
};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Guardpanel - control panel for a guarded wallet contract
#[derive(Parser, Debug)]
#[command(name = "guardpanel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, global = true, env = "GUARDPANEL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the wallet provider
    #[arg(long, global = true, value_name = "URL")]
    rpc_url: Option<String>,

    /// Wallet contract address
    #[arg(long, global = true, value_name = "ADDRESS")]
    contract: Option<String>,

    /// Contract interface description (path or URL)
    #[arg(long, global = true, value_name = "PATH_OR_URL")]
    abi: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short = 'l',
        long,
        global = true,
        env = "GUARDPANEL_LOG_LEVEL",
        default_value = "warn"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the account status
    Status,
    /// Deposit native currency into the wallet
    Deposit {
        /// Amount in whole units
        amount: String,
    },
    /// Transfer funds to a recipient
    Transfer {
        /// Recipient address
        to: String,
        /// Amount in whole units
        amount: String,
    },
    /// Set the guardian address
    SetGuardian {
        /// Guardian address
        address: String,
    },
    /// Set the high-value threshold
    SetThreshold {
        /// Threshold in whole units
        amount: String,
    },
    /// Mark an address as risky
    MarkRisky {
        /// Address to flag
        address: String,
    },
    /// Mark an address as trusted
    MarkTrusted {
        /// Address to trust
        address: String,
    },
    /// Enable safe mode
    ToggleSafeMode,
    /// Freeze the wallet as its owner
    ManualFreeze,
    /// Freeze the wallet as its guardian
    GuardianFreeze,
    /// Unfreeze the wallet once the timelock is over
    Unfreeze,
    /// Start an interactive shell
    Shell,
}

impl Command {
    /// The action and raw field values, for mutating commands
    fn into_action(self) -> Option<(Action, FormInputs)> {
        let request = match self {
            Self::Status | Self::Shell => return None,
            Self::Deposit { amount } => (
                Action::Deposit,
                FormInputs::new().with(InputField::DepositAmount, amount),
            ),
            Self::Transfer { to, amount } => (
                Action::Transfer,
                FormInputs::new()
                    .with(InputField::TransferTo, to)
                    .with(InputField::TransferAmount, amount),
            ),
            Self::SetGuardian { address } => (
                Action::SetGuardian,
                FormInputs::new().with(InputField::GuardianAddress, address),
            ),
            Self::SetThreshold { amount } => (
                Action::SetThreshold,
                FormInputs::new().with(InputField::ThresholdAmount, amount),
            ),
            Self::MarkRisky { address } => (
                Action::MarkRisky,
                FormInputs::new().with(InputField::RiskyAddress, address),
            ),
            Self::MarkTrusted { address } => (
                Action::MarkTrusted,
                FormInputs::new().with(InputField::TrustedAddress, address),
            ),
            Self::ToggleSafeMode => (Action::ToggleSafeMode, FormInputs::new()),
            Self::ManualFreeze => (Action::ManualFreeze, FormInputs::new()),
            Self::GuardianFreeze => (Action::GuardianFreeze, FormInputs::new()),
            Self::Unfreeze => (Action::Unfreeze, FormInputs::new()),
        };
        Some(request)
    }
}

/// Install the log subscriber; `RUST_LOG` wins over `level`
///
/// Logs go to stderr; stdout carries panel output only.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("guardpanel={level},guardpanel_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Resolve configuration: defaults, then file and environment, then flags
fn resolve_config(args: &Args) -> Result<PanelConfig> {
    let path = args
        .config
        .clone()
        .or_else(guardpanel_core::default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    ConfigOverrides {
        rpc_url: args.rpc_url.clone(),
        contract: args.contract.clone(),
        abi: args.abi.clone(),
    }
    .apply(&mut config)
    .context("Invalid command-line option")?;

    info!(
        source = ?config.source(),
        rpc_url = %config.provider.rpc_url,
        contract = %config.contract.address,
        abi = %config.contract.abi,
        "Configuration resolved"
    );
    Ok(config)
}

/// Delay before the status refresh that ends a completed one-shot
///
/// Actions that do not refresh on their own still get the refresh that
/// follows a connect, so every completed command prints the status.
fn follow_up_delay(refresh_after: Option<Duration>, config: &PanelConfig) -> Duration {
    refresh_after.unwrap_or_else(|| config.refresh.after_connect())
}

/// Run one command against a fresh session; returns whether it completed
async fn run_once(dispatcher: Arc<Dispatcher<JsonRpcProvider>>, command: Command) -> bool {
    let Some(session) = dispatcher.connect().await else {
        return false;
    };

    let Some((action, inputs)) = command.into_action() else {
        return dispatcher.refresh_status(Some(&session)).await.is_some();
    };

    match dispatcher.dispatch(Some(&session), action, &inputs).await {
        DispatchOutcome::Completed {
            tx_hash,
            refresh_after,
        } => {
            info!(%tx_hash, action = %action, "Action completed");
            let delay = follow_up_delay(refresh_after, dispatcher.config());
            if let Err(e) = dispatcher.refresh_after(session, delay).await {
                error!("Status refresh failed: {}", e);
            }
            true
        }
        DispatchOutcome::NotConnected
        | DispatchOutcome::Invalid(_)
        | DispatchOutcome::Busy
        | DispatchOutcome::Failed(_) => false,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Guardpanel starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(&args)?;
    let source = InterfaceSource::parse(&config.contract.abi);
    let provider =
        JsonRpcProvider::from_config(&config.provider).context("Failed to create provider")?;

    let (tx, rx) = mpsc::channel(100);
    let renderer = tokio::spawn(render::run(rx));
    let dispatcher = Arc::new(Dispatcher::new(provider, config, tx));

    // The failure has already been reported to the surface
    let loaded = dispatcher.load_interface(&source).await.is_ok();

    let completed = match (loaded, args.command) {
        (false, _) => false,
        (true, Command::Shell) => {
            let (panel, handle) = ControlPanel::new(Arc::clone(&dispatcher));
            let panel = tokio::spawn(panel.run());
            let shell_result = shell::run(handle).await;
            panel.await.context("Control panel task failed")??;
            shell_result?;
            true
        }
        (true, command) => run_once(Arc::clone(&dispatcher), command).await,
    };

    // Dropping the last sender lets the renderer finish printing
    drop(dispatcher);
    if let Err(e) = renderer.await {
        error!("Renderer task failed: {}", e);
    }

    info!("Guardpanel stopped");
    Ok(if completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
