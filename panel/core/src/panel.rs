//! Control Panel Event Loop
//!
//! Consumes [`PanelEvent`]s from a presentation surface and runs each one as
//! its own task, so a slow transaction never blocks other controls.
//!
//! The loop is the only owner of the current session. Each task gets a clone
//! of the session current when its event arrived; a connect task hands its new
//! session back through its join result and the loop swaps it in, then
//! schedules the post-connect refresh. A reconnect therefore never changes the
//! session an in-flight action is using.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::actions::Action;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::events::{FormInputs, PanelEvent};
use crate::provider::WalletProvider;
use crate::session::Session;

/// What a finished task reports back to the loop
enum TaskOutput<P> {
    /// A connect attempt finished
    Connected(Option<Session<P>>),
    /// Anything else finished
    Done,
}

/// Cloneable sender handed to presentation surfaces
#[derive(Clone, Debug)]
pub struct PanelHandle {
    tx: mpsc::Sender<PanelEvent>,
}

impl PanelHandle {
    /// Send a raw event
    pub async fn send(&self, event: PanelEvent) -> anyhow::Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("Control panel has stopped"))
    }

    /// Request a wallet connection
    pub async fn connect(&self) -> anyhow::Result<()> {
        self.send(PanelEvent::Connect).await
    }

    /// Request a status refresh
    pub async fn refresh_status(&self) -> anyhow::Result<()> {
        self.send(PanelEvent::RefreshStatus).await
    }

    /// Trigger a mutating action
    pub async fn submit(&self, action: Action, inputs: FormInputs) -> anyhow::Result<()> {
        self.send(PanelEvent::Submit { action, inputs }).await
    }

    /// Ask the panel to finish in-flight work and stop
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.send(PanelEvent::Shutdown).await
    }
}

/// Event loop driving a [`Dispatcher`]
pub struct ControlPanel<P: WalletProvider> {
    dispatcher: Arc<Dispatcher<P>>,
    session: Option<Session<P>>,
    events: mpsc::Receiver<PanelEvent>,
    tasks: JoinSet<TaskOutput<P>>,
}

impl<P: WalletProvider> ControlPanel<P> {
    /// Create a panel and the handle surfaces use to reach it
    pub fn new(dispatcher: Arc<Dispatcher<P>>) -> (Self, PanelHandle) {
        let (tx, events) = mpsc::channel(100);
        let panel = Self {
            dispatcher,
            session: None,
            events,
            tasks: JoinSet::new(),
        };
        (panel, PanelHandle { tx })
    }

    /// Run until `Shutdown` or until every handle is dropped
    ///
    /// In-flight tasks are drained before returning.
    pub async fn run(mut self) -> anyhow::Result<()> {
        tracing::debug!("Control panel started");

        loop {
            tokio::select! {
                biased;

                Some(result) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.on_task_finished(result);
                }

                event = self.events.recv() => {
                    match event {
                        Some(PanelEvent::Shutdown) | None => break,
                        Some(event) => self.handle_event(event),
                    }
                }
            }
        }

        tracing::debug!(in_flight = self.tasks.len(), "Draining in-flight tasks");
        while let Some(result) = self.tasks.join_next().await {
            self.on_task_finished(result);
        }

        tracing::debug!("Control panel stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: PanelEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let session = self.session.clone();

        match event {
            PanelEvent::Connect => {
                self.tasks
                    .spawn(async move { TaskOutput::Connected(dispatcher.connect().await) });
            }
            PanelEvent::RefreshStatus => {
                self.tasks.spawn(async move {
                    dispatcher.refresh_status(session.as_ref()).await;
                    TaskOutput::Done
                });
            }
            PanelEvent::Submit { action, inputs } => {
                self.tasks.spawn(async move {
                    let outcome = dispatcher.dispatch(session.as_ref(), action, &inputs).await;
                    if let (
                        DispatchOutcome::Completed {
                            refresh_after: Some(delay),
                            ..
                        },
                        Some(session),
                    ) = (outcome, session)
                    {
                        if let Err(e) = dispatcher.refresh_after(session, delay).await {
                            tracing::error!(action = %action, "Status refresh failed: {}", e);
                        }
                    }
                    TaskOutput::Done
                });
            }
            PanelEvent::Shutdown => {}
        }
    }

    fn on_task_finished(&mut self, result: Result<TaskOutput<P>, JoinError>) {
        match result {
            Ok(TaskOutput::Connected(Some(session))) => {
                tracing::debug!(session_id = %session.id, "Session replaced");
                self.session = Some(session.clone());

                let dispatcher = Arc::clone(&self.dispatcher);
                let delay = dispatcher.config().refresh.after_connect();
                self.tasks.spawn(async move {
                    if let Err(e) = dispatcher.refresh_after(session, delay).await {
                        tracing::error!("Status refresh failed: {}", e);
                    }
                    TaskOutput::Done
                });
            }
            Ok(TaskOutput::Connected(None) | TaskOutput::Done) => {}
            Err(e) => tracing::error!("Panel task failed: {}", e),
        }
    }
}
