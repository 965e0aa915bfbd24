//! Event source trait and scripted event playback.

use crate::event::model::Event;
use crate::foundation::error::ScenecastResult;
use serde_json::Value;

/// Lazy event iterator produced by an [`EventSource`] for one scenario.
pub type EventStream<'a> = Box<dyn Iterator<Item = ScenecastResult<Event>> + 'a>;

/// External algorithm adapter.
///
/// Yields a lazy, finite, non-restartable event trace for an opaque scenario
/// input. The director pulls one event at a time and never materializes the
/// full trace, so arbitrarily long algorithm runs stream through unchanged.
///
/// Implementations must be deterministic: the same scenario yields the same
/// trace. That determinism is what makes golden-output testing possible.
pub trait EventSource {
    /// Open a trace for `scenario`. The returned stream is consumed at most
    /// once.
    fn events(&mut self, scenario: &Value) -> ScenecastResult<EventStream<'_>>;
}

/// Deterministic source that replays a pre-recorded trace.
///
/// The scenario input is ignored; every call replays the same events. Useful
/// as a test double and for re-rendering captured algorithm runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    trace: Vec<Event>,
}

impl ScriptedSource {
    /// Source over a fixed trace.
    pub fn new(trace: Vec<Event>) -> Self {
        Self { trace }
    }
}

impl EventSource for ScriptedSource {
    fn events(&mut self, _scenario: &Value) -> ScenecastResult<EventStream<'_>> {
        Ok(Box::new(self.trace.clone().into_iter().map(Ok)))
    }
}
