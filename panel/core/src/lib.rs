//! Guardpanel Core - Headless Control Panel for a Guarded Wallet Contract
//!
//! This crate provides the command dispatch logic for a single fixed-address
//! wallet contract, completely independent of any presentation layer. It can
//! drive a terminal shell, a web view, or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Presentation Surfaces                     │
//! │   ┌──────────┐   ┌──────────────┐   ┌────────────────────┐   │
//! │   │   CLI    │   │ Interactive  │   │  Test harness      │   │
//! │   │ one-shot │   │    shell     │   │  (scripted)        │   │
//! │   └────┬─────┘   └──────┬───────┘   └─────────┬──────────┘   │
//! │        └────────────────┴─────────────────────┘              │
//! │                         │                                    │
//! │                  PanelEvent (up)                             │
//! │                 PanelMessage (down)                          │
//! └─────────────────────────┼────────────────────────────────────┘
//!                           │
//! ┌─────────────────────────┼────────────────────────────────────┐
//! │                   GUARDPANEL CORE                            │
//! │  ┌──────────────────────┴─────────────────────────────────┐  │
//! │  │             ControlPanel (event loop)                  │  │
//! │  │  ┌───────────┐  ┌───────────┐  ┌────────────────────┐  │  │
//! │  │  │ Session   │  │Dispatcher │  │  WalletProvider    │  │  │
//! │  │  │ (owned)   │  │ + busy set│  │  (JSON-RPC, ...)   │  │  │
//! │  │  └───────────┘  └───────────┘  └────────────────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Dispatcher`]: connects, dispatches actions and refreshes status
//! - [`ControlPanel`]: event loop owning the current session
//! - [`PanelMessage`]: messages sent from the core to surfaces
//! - [`PanelEvent`]: events sent from surfaces to the core
//! - [`Session`]: an authorized account bound to the contract
//! - [`WalletProvider`]: the signing backend seam
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use guardpanel_core::{
//!     load_config, ControlPanel, Dispatcher, InterfaceSource, JsonRpcProvider,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let provider = JsonRpcProvider::from_config(&config.provider)?;
//!     let source = InterfaceSource::parse(&config.contract.abi);
//!     let dispatcher = Arc::new(Dispatcher::new(provider, config, tx));
//!     dispatcher.load_interface(&source).await?;
//!
//!     let (panel, handle) = ControlPanel::new(dispatcher);
//!     tokio::spawn(panel.run());
//!     handle.connect().await?;
//!
//!     while let Some(msg) = rx.recv().await {
//!         // Render message
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`actions`]: the mutating actions, their fields, calls and messages
//! - [`busy`]: per-control re-entry guard
//! - [`config`]: TOML / environment / CLI configuration
//! - [`contract`]: contract handle bound to a provider and signer
//! - [`dispatcher`]: connect, dispatch and status refresh
//! - [`events`]: events from surfaces to the core
//! - [`failure`]: failure classification
//! - [`interface`]: runtime-loaded contract interface description
//! - [`messages`]: messages from the core to surfaces
//! - [`panel`]: event loop
//! - [`provider`]: wallet provider abstraction (JSON-RPC)
//! - [`session`]: wallet session
//! - [`status`]: account status decoding and rendering
//! - [`validation`]: input validation and unit conversion
//!
//! # No Presentation Dependencies
//!
//! This crate has **zero** dependencies on any terminal or GUI toolkit.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod busy;
pub mod config;
pub mod contract;
pub mod dispatcher;
pub mod events;
pub mod failure;
pub mod interface;
pub mod messages;
pub mod panel;
pub mod provider;
pub mod session;
pub mod status;
pub mod validation;

// Re-exports for convenience
pub use actions::{Action, FieldSpec, ValidatedInputs, ValidatedValue};
pub use busy::{BusyControls, BusyGuard};
pub use contract::{ContractCall, ContractError, ContractHandle, PendingTransaction};
pub use dispatcher::{
    DispatchOutcome, Dispatcher, InterfaceState, NOT_CONNECTED_MESSAGE, NO_PROVIDER_MESSAGE,
};
pub use events::{FormInputs, PanelEvent};
pub use failure::{classify_failure, Failure, FailureKind, TIMELOCK_MESSAGE};
pub use interface::{ContractInterface, InterfaceError, InterfaceSource};
pub use messages::{Control, InputField, NotifyLevel, PanelMessage, SessionId};
pub use panel::{ControlPanel, PanelHandle};
pub use provider::{
    CallRequest, JsonRpcProvider, ProviderError, TransactionReceipt, WalletProvider,
};
pub use session::Session;
pub use status::{AccountStatus, StatusDecodeError, StatusView};
pub use validation::{Amount, FieldKind, ValidationError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, ContractConfig, PanelConfig, PanelToml, ProviderConfig, RefreshConfig,
};
