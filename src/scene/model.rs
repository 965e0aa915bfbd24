//! Scene configuration data model and loading.

use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::scene::validate::validate_scene;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_order() -> i32 {
    1
}

/// Construction spec for one named widget instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetSpecDef {
    /// Widget type identifier, resolved through the registry.
    #[serde(rename = "type")]
    pub kind: String,
    /// Constructor parameters handed to the widget factory.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// Declarative rule mapping an event type (or a scene action step) to one
/// widget method call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBindingDef {
    /// Name of the widget instance to invoke.
    pub widget: String,
    /// Method name to invoke on that widget.
    pub action: String,
    /// Literal or `${...}`-templated keyword parameters.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    /// Dispatch order among bindings for the same event type. Ties execute
    /// in declaration order.
    #[serde(default = "default_order")]
    pub order: i32,
    /// Optional guard condition; the binding is skipped when not satisfied.
    #[serde(default)]
    pub condition: Option<String>,
}

/// Declarative description of widgets and event reactions for one
/// visualization scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfigDef {
    /// Named widget instances this scene can create.
    #[serde(default)]
    pub widgets: BTreeMap<String, WidgetSpecDef>,
    /// Event type name to ordered reaction list.
    #[serde(default)]
    pub event_bindings: BTreeMap<String, Vec<EventBindingDef>>,
    /// Scene-defined beat actions the director delegates to when a beat's
    /// action is not one of its generic handlers.
    #[serde(default)]
    pub actions: BTreeMap<String, Vec<EventBindingDef>>,
    /// Free-form values exposed to templates as the `config` root.
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

/// Boundary object for scene configuration files.
///
/// This is the JSON-facing, human-edited description of one visualization
/// scenario. It is validated and compiled into dispatch tables when
/// constructing a [`crate::scene::engine::SceneEngine`].
#[derive(Debug, Clone)]
pub struct SceneConfig {
    def: SceneConfigDef,
}

impl SceneConfig {
    /// Parse a scene configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScenecastResult<Self> {
        let def: SceneConfigDef = serde_json::from_reader(r)
            .map_err(|e| ScenecastError::configuration(format!("parse scene config JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a scene configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScenecastResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScenecastError::configuration(format!(
                "open scene config JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Wrap a programmatically built definition.
    pub fn from_def(def: SceneConfigDef) -> Self {
        Self { def }
    }

    /// Validate structure and references: every binding's widget must exist,
    /// every template and condition must parse.
    pub fn validate(&self) -> ScenecastResult<()> {
        validate_scene(&self.def)
            .map_err(|e| ScenecastError::configuration(format!("scene config validation failed: {e}")))
    }

    pub(crate) fn def(&self) -> &SceneConfigDef {
        &self.def
    }
}
