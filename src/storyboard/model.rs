//! Storyboard data model and loading.

use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::storyboard::validate::validate_storyboard;
use crate::timing::model::TimingConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_language() -> String {
    "en".to_owned()
}

fn default_voice() -> String {
    "default".to_owned()
}

/// Narration settings for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationDef {
    /// When false the narration backend is never invoked and every beat runs
    /// at its animation base duration.
    #[serde(default)]
    pub enabled: bool,
    /// Language tag passed to the backend.
    #[serde(default = "default_language")]
    pub language: String,
    /// Voice identifier passed to the backend.
    #[serde(default = "default_voice")]
    pub voice: String,
}

impl Default for NarrationDef {
    fn default() -> Self {
        Self {
            enabled: false,
            language: default_language(),
            voice: default_voice(),
        }
    }
}

/// Smallest unit of storyboard execution: one action with arguments and
/// optional narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatDef {
    /// Action identifier. Must resolve to a generic handler or a scene
    /// action at execution time, or the run fails.
    pub action: String,
    /// Arguments handed to the action handler.
    #[serde(default)]
    pub args: BTreeMap<String, Value>,
    /// Text spoken over this beat.
    #[serde(default)]
    pub narration: Option<String>,
    /// Literal narration word to action identifier. Scaffold for word-level
    /// sync: occurrences are logged, no real-time callbacks are wired.
    #[serde(default)]
    pub bookmarks: BTreeMap<String, String>,
    /// Explicit floor for the beat's run time, seconds.
    #[serde(default)]
    pub min_duration: Option<f64>,
    /// Explicit ceiling for the beat's run time, seconds. The only thing
    /// allowed to clip narration.
    #[serde(default)]
    pub max_duration: Option<f64>,
}

/// A contiguous staging of widgets and beats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShotDef {
    /// Widget instances this shot brings on screen via `show_widgets`.
    /// Empty means every configured widget.
    #[serde(default)]
    pub widgets: Vec<String>,
    /// Ordered beats.
    #[serde(default)]
    pub beats: Vec<BeatDef>,
}

/// Top-level narrative grouping, with enter/exit transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActDef {
    /// Act title, shown by `show_title` beats that give no text of their own.
    pub title: String,
    /// Ordered shots.
    #[serde(default)]
    pub shots: Vec<ShotDef>,
}

/// Immutable declarative script for a full run.
///
/// A storyboard with zero acts, or an act with zero shots, is valid and
/// produces no output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryboardDef {
    /// Optional overall title.
    #[serde(default)]
    pub title: String,
    /// Ordered acts.
    #[serde(default)]
    pub acts: Vec<ActDef>,
    /// Pacing configuration for the run.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Narration configuration for the run.
    #[serde(default)]
    pub narration: NarrationDef,
}

/// Boundary object for storyboard files.
///
/// This is the JSON-facing, human-edited script. It is validated when
/// constructing a [`crate::director::runner::Director`] and read-only for
/// the run's duration.
#[derive(Debug, Clone)]
pub struct Storyboard {
    def: StoryboardDef,
}

impl Storyboard {
    /// Parse a storyboard from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScenecastResult<Self> {
        let def: StoryboardDef = serde_json::from_reader(r)
            .map_err(|e| ScenecastError::configuration(format!("parse storyboard JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a storyboard from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScenecastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScenecastError::configuration(format!("open storyboard JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Wrap a programmatically built definition.
    pub fn from_def(def: StoryboardDef) -> Self {
        Self { def }
    }

    /// Validate structure: non-empty actions, sane durations, and
    /// `min_duration <= max_duration` wherever both are set.
    pub fn validate(&self) -> ScenecastResult<()> {
        validate_storyboard(&self.def).map_err(|e| {
            ScenecastError::configuration(format!("storyboard validation failed: {e}"))
        })
    }

    pub(crate) fn def(&self) -> &StoryboardDef {
        &self.def
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/model.rs"]
mod tests;
