//! Scenecast is a declarative storyboard execution engine for narrated
//! instructional videos.
//!
//! A [`Storyboard`] (acts → shots → beats) drives a [`Director`], which
//! resolves each beat to one of a small set of generic handlers or delegates
//! to the [`SceneEngine`]. The scene engine routes externally produced
//! [`Event`]s to widget method calls through declarative bindings with
//! `${...}` parameter templates, and the timing model reconciles animation
//! pacing against measured narration duration ("hybrid timing").
//!
//! Rendering backends, text-to-speech engines, and concrete widgets are
//! collaborators behind the [`Widget`], [`EventSource`], and
//! [`NarrationBackend`] traits:
//!
//! - Load and validate a [`Storyboard`] and a [`SceneConfig`]
//! - Build a [`SceneEngine`] over an injected [`WidgetRegistry`]
//! - Create a [`Director`] and call [`Director::run`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod schema;

/// Storyboard interpretation and run orchestration.
pub mod director;
/// Event contract for external algorithm adapters.
pub mod event;
/// Narration collaborator boundary.
pub mod narration;
/// Scene configuration, the widget contract, and event dispatch.
pub mod scene;
/// Storyboard data model and loading.
pub mod storyboard;
/// Parameter template engine.
pub mod template;
/// Pacing buckets and hybrid narration timing.
pub mod timing;

pub use crate::foundation::core::{BeatAddress, StepIndex};
pub use crate::foundation::error::{ScenecastError, ScenecastResult};

pub use crate::director::runner::{Director, DirectorState, RunStats, StopHandle};
pub use crate::event::model::Event;
pub use crate::event::source::{EventSource, EventStream, ScriptedSource};
pub use crate::narration::backend::{FixedRateNarration, NarrationBackend, NarrationClip};
pub use crate::scene::engine::SceneEngine;
pub use crate::scene::model::{EventBindingDef, SceneConfig, SceneConfigDef, WidgetSpecDef};
pub use crate::scene::widget::{CallOutcome, Widget, WidgetFactory, WidgetRegistry};
pub use crate::storyboard::model::{
    ActDef, BeatDef, NarrationDef, ShotDef, Storyboard, StoryboardDef,
};
pub use crate::template::engine::{
    CompiledCondition, CompiledParams, CompiledValue, Context, Resolved, resolve_params,
};
pub use crate::timing::model::{Bucket, TimingConfig, reconcile};
