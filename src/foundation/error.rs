use crate::foundation::core::BeatAddress;

/// Convenience result type used across scenecast.
pub type ScenecastResult<T> = Result<T, ScenecastError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-binding dispatch failures and unresolvable parameter templates are
/// deliberately not variants here: they are logged and skipped at the
/// dispatch site, so one broken visual reaction never halts a run.
#[derive(thiserror::Error, Debug)]
pub enum ScenecastError {
    /// Invalid storyboard or scene configuration data. Raised before any
    /// execution begins.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A beat's action resolved to no generic handler and no scene action.
    #[error("unknown action '{action}' at {address}; available actions: {}", available.join(", "))]
    UnknownAction {
        /// Storyboard position of the offending beat.
        address: BeatAddress,
        /// The action identifier that failed to resolve.
        action: String,
        /// Every action name that would have resolved, generic and
        /// scene-configured.
        available: Vec<String>,
    },

    /// Narration backend failure surfaced to the caller.
    #[error("narration error: {0}")]
    Narration(String),

    /// Event producer failure while opening or draining a trace.
    #[error("event source error: {0}")]
    EventSource(String),

    /// Widget construction or lifecycle failure.
    #[error("widget error: {0}")]
    Widget(String),

    /// Wrapped lower-level error from collaborators.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScenecastError {
    /// Build a [`ScenecastError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ScenecastError::Narration`] value.
    pub fn narration(msg: impl Into<String>) -> Self {
        Self::Narration(msg.into())
    }

    /// Build a [`ScenecastError::EventSource`] value.
    pub fn event_source(msg: impl Into<String>) -> Self {
        Self::EventSource(msg.into())
    }

    /// Build a [`ScenecastError::Widget`] value.
    pub fn widget(msg: impl Into<String>) -> Self {
        Self::Widget(msg.into())
    }
}
