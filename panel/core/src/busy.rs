//! Busy Controls
//!
//! Per-control re-entry guard. A control is busy from the moment its action
//! passes validation until the action finishes, successfully or not.
//!
//! This is a flag per control, not a queue: a second trigger of a busy control
//! is suppressed rather than serialized, and distinct controls never wait on
//! each other.
//!
//! A guard that reports to a surface tells it when the control goes idle,
//! including when the action panics or its future is dropped.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::messages::{Control, PanelMessage};

/// Set of controls whose action is in flight
#[derive(Clone, Debug, Default)]
pub struct BusyControls {
    busy: Arc<Mutex<HashSet<Control>>>,
}

impl BusyControls {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a control busy, or `None` if it already is
    ///
    /// The control is released when the returned guard is dropped.
    #[must_use]
    pub fn try_acquire(&self, control: Control) -> Option<BusyGuard> {
        if !self.busy.lock().insert(control) {
            return None;
        }
        Some(BusyGuard {
            control,
            busy: Arc::clone(&self.busy),
            held: true,
            surface: None,
        })
    }

    /// Whether a control is currently busy
    #[must_use]
    pub fn is_busy(&self, control: Control) -> bool {
        self.busy.lock().contains(&control)
    }

    /// Number of busy controls
    #[must_use]
    pub fn count(&self) -> usize {
        self.busy.lock().len()
    }
}

/// Releases its control on drop
#[derive(Debug)]
pub struct BusyGuard {
    control: Control,
    busy: Arc<Mutex<HashSet<Control>>>,
    held: bool,
    /// Told when the control goes idle
    surface: Option<mpsc::Sender<PanelMessage>>,
}

impl BusyGuard {
    /// Send `ControlBusy { busy: false }` to `surface` once released
    #[must_use]
    pub fn reporting_to(mut self, surface: mpsc::Sender<PanelMessage>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Release the control and wait until the surface has the idle message
    pub async fn release(mut self) {
        self.free();
        if let Some(surface) = self.surface.take() {
            if let Err(e) = surface.send(self.idle_message()).await {
                tracing::warn!(control = %self.control, "Failed to report idle control: {}", e);
            }
        }
    }

    fn free(&mut self) {
        if std::mem::take(&mut self.held) {
            self.busy.lock().remove(&self.control);
        }
    }

    fn idle_message(&self) -> PanelMessage {
        PanelMessage::ControlBusy {
            control: self.control,
            busy: false,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.free();
        // Dropped without `release`: the action panicked or was cancelled
        if let Some(surface) = self.surface.take() {
            if let Err(e) = surface.try_send(self.idle_message()) {
                tracing::warn!(control = %self.control, "Failed to report idle control: {}", e);
            }
        }
    }
}
