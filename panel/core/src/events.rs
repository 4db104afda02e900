//! Panel Events
//!
//! Events sent from the presentation layer to the dispatch core. Surfaces are
//! "dumb": they report which control was triggered together with the raw
//! contents of their input elements, and the core decides what happens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::messages::InputField;

/// Events from a presentation surface to the dispatch core
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PanelEvent {
    /// User asked to connect (or reconnect) the wallet
    Connect,

    /// User asked for a status refresh
    RefreshStatus,

    /// User triggered a mutating action
    Submit {
        /// Which action
        action: Action,
        /// Raw values of the surface's input elements
        inputs: FormInputs,
    },

    /// Surface is going away; finish in-flight work and stop
    Shutdown,
}

/// Raw input element values as read from the presentation layer
///
/// Values are stored untouched; [`FormInputs::read`] trims on the way out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInputs(BTreeMap<InputField, String>);

impl FormInputs {
    /// Create an empty set of inputs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, field: InputField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field's raw value
    pub fn set(&mut self, field: InputField, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    /// Read a field's trimmed value; missing fields read as empty
    #[must_use]
    pub fn read(&self, field: InputField) -> &str {
        self.0.get(&field).map_or("", |v| v.trim())
    }
}

impl<const N: usize> From<[(InputField, &str); N]> for FormInputs {
    fn from(values: [(InputField, &str); N]) -> Self {
        Self(
            values
                .into_iter()
                .map(|(field, value)| (field, value.to_string()))
                .collect(),
        )
    }
}
