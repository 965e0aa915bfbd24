//! Widget contract, factories, and registry.

use crate::foundation::error::ScenecastResult;
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of dispatching a named method on a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The widget recognized and executed the method.
    Handled,
    /// The widget does not expose the method. The scene engine logs and
    /// skips the owning binding.
    UnknownMethod,
}

/// A visual widget instance driven by the scene engine.
///
/// Widgets expose lifecycle methods plus named action methods with keyword
/// parameters. Widgets never interpret events themselves: all event
/// semantics live in the binding layer, so the same widget works for any
/// algorithm whose scene configuration drives it.
pub trait Widget {
    /// Bring the widget on screen.
    fn show(&mut self, params: &BTreeMap<String, Value>) -> ScenecastResult<()>;

    /// Remove the widget from the screen and release its animation state.
    fn hide(&mut self) -> ScenecastResult<()>;

    /// Invoke a named action method with resolved keyword parameters.
    ///
    /// `run_time` is the seconds budget for any animation the call starts.
    fn call(
        &mut self,
        method: &str,
        params: &BTreeMap<String, Value>,
        run_time: f64,
    ) -> ScenecastResult<CallOutcome>;
}

/// Creates widget instances for one widget type identifier.
pub trait WidgetFactory {
    /// Construct an instance from configuration parameters.
    fn create(&self, params: &BTreeMap<String, Value>) -> ScenecastResult<Box<dyn Widget>>;

    /// Action methods instances respond to.
    ///
    /// Used to lint bindings at scene engine construction time. An empty
    /// list disables the lint for this type.
    fn methods(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// Explicit widget type registry injected into the scene engine.
///
/// Replaces ambient global registries: the registry is a plain value with
/// clear ownership, and nothing about it is mutable after engine
/// construction.
#[derive(Default)]
pub struct WidgetRegistry {
    factories: BTreeMap<String, Box<dyn WidgetFactory>>,
}

impl WidgetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a widget type identifier. Re-registering a
    /// name replaces the previous factory.
    pub fn register(&mut self, kind: impl Into<String>, factory: Box<dyn WidgetFactory>) {
        self.factories.insert(kind.into(), factory);
    }

    pub(crate) fn get(&self, kind: &str) -> Option<&dyn WidgetFactory> {
        self.factories.get(kind).map(|f| f.as_ref())
    }
}
