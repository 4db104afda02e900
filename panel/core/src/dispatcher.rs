//! Dispatcher - Command Dispatch Core
//!
//! The Dispatcher turns user intents into contract calls. It:
//! - Establishes wallet sessions
//! - Validates inputs and dispatches mutating actions
//! - Fetches and renders account status
//! - Guards each control against re-entry while its action is in flight
//! - Reports every visible effect to the presentation layer
//!
//! # Design Philosophy
//!
//! The Dispatcher is UI-agnostic and holds no session. Every operation takes
//! the session it should run against, so two actions in flight at the same
//! time each see the session they were started with. It communicates through:
//! - `PanelMessage`: effects sent TO the presentation surface
//! - return values (`DispatchOutcome`, `Option<Session>`) for the caller
//!
//! Nothing is retried: a failure is reported and ends the current action only.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actions::Action;
use crate::busy::{BusyControls, BusyGuard};
use crate::config::PanelConfig;
use crate::contract::{ContractError, ContractHandle};
use crate::events::FormInputs;
use crate::failure::{classify_failure, Failure};
use crate::interface::{ContractInterface, InterfaceError, InterfaceSource};
use crate::messages::{Control, NotifyLevel, PanelMessage};
use crate::provider::{ProviderError, WalletProvider};
use crate::session::Session;
use crate::status::{AccountStatus, StatusView, STATUS_METHOD};
use crate::validation::{truncate_address, ValidationError};

/// Reported when an operation needs a session and none exists
pub const NOT_CONNECTED_MESSAGE: &str = "Wallet not connected.";

/// Reported when nothing answers at the provider endpoint
pub const NO_PROVIDER_MESSAGE: &str =
    "No wallet provider detected. Start a wallet provider or point --rpc-url at one, then connect again.";

/// Loading state of the contract interface description
#[derive(Clone, Debug)]
pub enum InterfaceState {
    /// Not loaded yet
    Loading,
    /// Loaded and usable
    Ready(Arc<ContractInterface>),
    /// Loading failed; terminal for the lifetime of the dispatcher
    Failed(String),
}

/// Result of dispatching one action
#[derive(Clone, Debug)]
pub enum DispatchOutcome {
    /// No session; the contract was not touched
    NotConnected,
    /// A field failed validation; the contract was not touched
    Invalid(ValidationError),
    /// The action's control is already busy; the trigger was suppressed
    Busy,
    /// The transaction was included
    Completed {
        /// Transaction hash
        tx_hash: B256,
        /// Delay before the follow-up status refresh, if the action needs one
        refresh_after: Option<Duration>,
    },
    /// Submission or inclusion failed
    Failed(Failure),
}

impl DispatchOutcome {
    /// Whether the transaction was included
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// The Dispatcher - headless command dispatch core
pub struct Dispatcher<P: WalletProvider> {
    /// Configuration
    config: PanelConfig,
    /// Wallet provider
    provider: Arc<P>,
    /// Contract interface description
    interface: RwLock<InterfaceState>,
    /// Controls whose action is in flight
    busy: BusyControls,
    /// Channel to send messages to the presentation surface
    tx: mpsc::Sender<PanelMessage>,
}

impl<P: WalletProvider> Dispatcher<P> {
    /// Create a new Dispatcher with the given provider
    pub fn new(provider: P, config: PanelConfig, tx: mpsc::Sender<PanelMessage>) -> Self {
        Self {
            config,
            provider: Arc::new(provider),
            interface: RwLock::new(InterfaceState::Loading),
            busy: BusyControls::new(),
            tx,
        }
    }

    /// Use an already parsed interface description
    #[must_use]
    pub fn with_interface(self, interface: ContractInterface) -> Self {
        *self.interface.write() = InterfaceState::Ready(Arc::new(interface));
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Get the provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the busy set
    pub fn busy(&self) -> &BusyControls {
        &self.busy
    }

    /// Current interface loading state
    pub fn interface_state(&self) -> InterfaceState {
        self.interface.read().clone()
    }

    /// Load the contract interface description
    ///
    /// A failure is terminal: every later connect reports it.
    pub async fn load_interface(&self, source: &InterfaceSource) -> Result<(), InterfaceError> {
        match ContractInterface::load(source).await {
            Ok(interface) => {
                let functions = interface.function_count();
                *self.interface.write() = InterfaceState::Ready(Arc::new(interface));
                self.send(PanelMessage::InterfaceReady { functions }).await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "Failed to load contract interface");
                *self.interface.write() = InterfaceState::Failed(e.to_string());
                self.send(PanelMessage::InterfaceFailed {
                    error: e.to_string(),
                })
                .await;
                self.notify(
                    NotifyLevel::Error,
                    &format!("Failed to load contract interface: {e}"),
                )
                .await;
                Err(e)
            }
        }
    }

    /// Authorize an account and bind the contract to it
    ///
    /// Returns the new session; the caller owns it from here on. Re-invoking
    /// simply re-authorizes and yields a replacement session.
    pub async fn connect(&self) -> Option<Session<P>> {
        let Some(guard) = self.acquire(Control::Connect) else {
            tracing::debug!("Connect already in flight");
            return None;
        };
        self.mark_busy(Control::Connect).await;

        let session = self.establish_session().await;

        guard.release().await;
        session
    }

    async fn establish_session(&self) -> Option<Session<P>> {
        self.notify(NotifyLevel::Info, "Connecting to wallet...").await;

        let interface = match self.interface_state() {
            InterfaceState::Ready(interface) => interface,
            InterfaceState::Loading => {
                self.notify(
                    NotifyLevel::Error,
                    "Contract interface is still loading. Try again in a moment.",
                )
                .await;
                return None;
            }
            InterfaceState::Failed(error) => {
                self.notify(
                    NotifyLevel::Error,
                    &format!("Contract interface unavailable ({error}). Restart the panel."),
                )
                .await;
                return None;
            }
        };

        if let Err(e) = self.provider.check_available().await {
            tracing::warn!(provider = self.provider.name(), error = %e, "Wallet provider check failed");
            let message = match e {
                ProviderError::Unavailable { .. } => NO_PROVIDER_MESSAGE.to_string(),
                other => format!("Failed to connect wallet: {other}"),
            };
            self.notify(NotifyLevel::Error, &message).await;
            return None;
        }

        let account = match self
            .provider
            .request_accounts()
            .await
            .and_then(|accounts| accounts.into_iter().next().ok_or(ProviderError::NoAccounts))
        {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(error = %e, "Wallet authorization failed");
                self.notify(
                    NotifyLevel::Error,
                    &format!("Failed to connect wallet: {e}"),
                )
                .await;
                return None;
            }
        };

        let contract = ContractHandle::new(
            self.config.contract.address,
            account,
            interface,
            Arc::clone(&self.provider),
        );
        let session = Session::new(account, contract);

        tracing::info!(
            session_id = %session.id,
            account = %account,
            contract = %self.config.contract.address,
            "Wallet connected"
        );

        self.send(PanelMessage::SessionEstablished {
            account,
            contract: self.config.contract.address,
            account_display: session.account_display(),
            contract_display: truncate_address(&self.config.contract.address),
        })
        .await;
        self.notify(NotifyLevel::Success, "Wallet connected successfully!")
            .await;

        Some(session)
    }

    /// Fetch, decode and report the account status
    pub async fn refresh_status(&self, session: Option<&Session<P>>) -> Option<AccountStatus> {
        let Some(session) = session else {
            self.notify(NotifyLevel::Warning, NOT_CONNECTED_MESSAGE).await;
            return None;
        };
        let Some(guard) = self.acquire(Control::RefreshStatus) else {
            tracing::debug!(session_id = %session.id, "Status refresh already in flight");
            return None;
        };
        self.mark_busy(Control::RefreshStatus).await;
        self.notify(NotifyLevel::Info, "Fetching wallet status...").await;

        let status = match fetch_status(session).await {
            Ok(status) => {
                let view = StatusView::render(&status, &self.config.contract.currency_symbol);
                self.send(PanelMessage::Status {
                    status: status.clone(),
                    view,
                })
                .await;
                self.notify(NotifyLevel::Success, "Status refreshed successfully!")
                    .await;
                Some(status)
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id, error = %e, "Status refresh failed");
                self.notify(NotifyLevel::Error, &format!("Failed to fetch status: {e}"))
                    .await;
                None
            }
        };

        guard.release().await;
        status
    }

    /// Dispatch one mutating action
    ///
    /// Validation happens before the control is marked busy, so a rejected
    /// field never produces a partial invocation. Once busy, the control is
    /// released and reported idle on every exit path, including a panic in
    /// the provider or the caller dropping this future.
    pub async fn dispatch(
        &self,
        session: Option<&Session<P>>,
        action: Action,
        inputs: &FormInputs,
    ) -> DispatchOutcome {
        let Some(session) = session else {
            self.notify(NotifyLevel::Warning, NOT_CONNECTED_MESSAGE).await;
            return DispatchOutcome::NotConnected;
        };

        let validated = match action.validate(inputs) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::debug!(action = %action, field = ?e.field(), "Rejected input");
                self.notify(NotifyLevel::Error, &e.to_string()).await;
                return DispatchOutcome::Invalid(e);
            }
        };

        let control = action.control();
        let Some(guard) = self.acquire(control) else {
            tracing::debug!(action = %action, "Suppressed re-entry while busy");
            return DispatchOutcome::Busy;
        };
        self.mark_busy(control).await;

        let symbol = &self.config.contract.currency_symbol;
        self.notify(NotifyLevel::Info, &action.pending_message(&validated, symbol))
            .await;

        let call = action.build_call(&validated);
        let result = async {
            let pending = session.contract.submit(&call).await?;
            let tx_hash = pending.tx_hash();
            tracing::info!(
                session_id = %session.id,
                action = %action,
                %tx_hash,
                "Transaction submitted"
            );
            pending.wait().await?;
            Ok::<_, ContractError>(tx_hash)
        }
        .await;

        let outcome = match result {
            Ok(tx_hash) => {
                self.notify(
                    NotifyLevel::Success,
                    &action.success_message(&validated, symbol),
                )
                .await;
                let fields = validated.fields();
                if !fields.is_empty() {
                    self.send(PanelMessage::ClearInputs { fields }).await;
                }
                DispatchOutcome::Completed {
                    tx_hash,
                    refresh_after: action
                        .refreshes_status()
                        .then(|| self.config.refresh.after_action()),
                }
            }
            Err(e) => {
                let failure = classify_failure(action, &e, session.contract.interface());
                tracing::warn!(
                    session_id = %session.id,
                    action = %action,
                    kind = ?failure.kind,
                    error = %e,
                    "Action failed"
                );
                self.notify(NotifyLevel::Error, &failure.message).await;
                DispatchOutcome::Failed(failure)
            }
        };

        guard.release().await;
        outcome
    }

    /// Refresh the status of `session` once `delay` has passed
    ///
    /// The delay gives the provider time to reflect the new chain state; the
    /// refreshed values are eventually consistent, not guaranteed current.
    pub fn refresh_after(self: &Arc<Self>, session: Session<P>, delay: Duration) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            dispatcher.refresh_status(Some(&session)).await;
        })
    }

    /// Mark a control busy; its guard reports it idle again
    fn acquire(&self, control: Control) -> Option<BusyGuard> {
        self.busy
            .try_acquire(control)
            .map(|guard| guard.reporting_to(self.tx.clone()))
    }

    /// Tell the surface a control is busy
    async fn mark_busy(&self, control: Control) {
        self.send(PanelMessage::ControlBusy {
            control,
            busy: true,
        })
        .await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(PanelMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the presentation surface
    async fn send(&self, msg: PanelMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

async fn fetch_status<P: WalletProvider>(session: &Session<P>) -> Result<AccountStatus, ContractError> {
    let values = session.contract.read(STATUS_METHOD, &[]).await?;
    AccountStatus::from_tuple(&values).map_err(|e| {
        ContractError::Interface(InterfaceError::Decode {
            name: STATUS_METHOD.to_string(),
            message: e.to_string(),
        })
    })
}
