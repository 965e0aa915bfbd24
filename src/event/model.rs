//! Event data model exchanged across the adapter boundary.

use crate::foundation::core::StepIndex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A fact emitted by an external algorithm or data source during execution.
///
/// Events are immutable value objects. The producer hands each event to the
/// scene engine and never sees it again; the engine discards it after
/// dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type name the scene configuration binds on, e.g. `enqueue`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Arbitrary typed values: positions, node ids, weights.
    #[serde(default)]
    pub payload: BTreeMap<String, Value>,
    /// Monotonically increasing position in the producer's trace.
    pub step_index: StepIndex,
    /// Optional producer-specific annotations.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl Event {
    /// Create an event with an empty payload.
    pub fn new(kind: impl Into<String>, step_index: u64) -> Self {
        Self {
            kind: kind.into(),
            payload: BTreeMap::new(),
            step_index: StepIndex(step_index),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a payload entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Template-context view of the event: `event.type`, `event.payload.*`,
    /// `event.step_index`, `event.metadata.*`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.kind,
            "payload": self.payload,
            "step_index": self.step_index.0,
            "metadata": self.metadata,
        })
    }
}
