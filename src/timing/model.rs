//! Timing buckets, configuration, and narration reconciliation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Duration bucket an action draws its base run time from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    /// Titles, widget staging, and other interface moves.
    Ui,
    /// Per-event reactions while playing an algorithm trace.
    Events,
    /// Transitions and emphasis effects.
    Effects,
    /// Deliberate pauses.
    Waits,
}

impl Bucket {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "ui" => Some(Self::Ui),
            "events" => Some(Self::Events),
            "effects" => Some(Self::Effects),
            "waits" => Some(Self::Waits),
            _ => None,
        }
    }
}

fn default_ui() -> f64 {
    1.0
}

fn default_events() -> f64 {
    0.8
}

fn default_effects() -> f64 {
    0.5
}

fn default_waits() -> f64 {
    0.5
}

fn default_mode() -> String {
    "normal".to_owned()
}

fn default_multipliers() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("draft".to_owned(), 0.5),
        ("normal".to_owned(), 1.0),
        ("fast".to_owned(), 0.25),
    ])
}

fn default_actions() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("show_title".to_owned(), "ui".to_owned()),
        ("show_widgets".to_owned(), "ui".to_owned()),
        ("play_events".to_owned(), "events".to_owned()),
        ("wait".to_owned(), "waits".to_owned()),
        ("outro".to_owned(), "effects".to_owned()),
    ])
}

/// Per-run pacing configuration: bucket base durations in seconds, the active
/// mode, and mode multipliers.
///
/// Constructed once from configuration, immutable thereafter, queried for
/// every beat and event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Base seconds for the `ui` bucket.
    #[serde(default = "default_ui")]
    pub ui: f64,
    /// Base seconds for the `events` bucket.
    #[serde(default = "default_events")]
    pub events: f64,
    /// Base seconds for the `effects` bucket.
    #[serde(default = "default_effects")]
    pub effects: f64,
    /// Base seconds for the `waits` bucket.
    #[serde(default = "default_waits")]
    pub waits: f64,
    /// Active pacing mode. Unknown modes fall back to `normal`.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Mode name to bucket multiplier.
    #[serde(default = "default_multipliers")]
    pub multipliers: BTreeMap<String, f64>,
    /// Action name to bucket name, consulted by [`TimingConfig::base_for`].
    /// Pre-seeded for the director's generic actions; scene configurations
    /// may add their own actions here.
    #[serde(default = "default_actions")]
    pub actions: BTreeMap<String, String>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ui: default_ui(),
            events: default_events(),
            effects: default_effects(),
            waits: default_waits(),
            mode: default_mode(),
            multipliers: default_multipliers(),
            actions: default_actions(),
        }
    }
}

impl TimingConfig {
    /// Unscaled base seconds for a bucket.
    pub fn bucket_value(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::Ui => self.ui,
            Bucket::Events => self.events,
            Bucket::Effects => self.effects,
            Bucket::Waits => self.waits,
        }
    }

    /// Mode-scaled seconds for a bucket.
    pub fn scaled(&self, bucket: Bucket) -> f64 {
        self.bucket_value(bucket) * self.multiplier()
    }

    /// Mode-scaled base run time for an action.
    ///
    /// Never fails: an action absent from the action map (and not itself a
    /// bucket name) falls back to the `ui` bucket with a warning, so one
    /// misconfigured action cannot abort a render.
    pub fn base_for(&self, action: &str) -> f64 {
        let bucket = self
            .actions
            .get(action)
            .and_then(|name| Bucket::from_name(name))
            .or_else(|| Bucket::from_name(action))
            .unwrap_or_else(|| {
                tracing::warn!(action, "no timing bucket for action, defaulting to ui");
                Bucket::Ui
            });
        self.scaled(bucket)
    }

    fn multiplier(&self) -> f64 {
        if let Some(m) = self.multipliers.get(&self.mode) {
            return *m;
        }
        tracing::debug!(mode = %self.mode, "unknown timing mode, falling back to normal");
        self.multipliers.get("normal").copied().unwrap_or(1.0)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (name, v) in [
            ("ui", self.ui),
            ("events", self.events),
            ("effects", self.effects),
            ("waits", self.waits),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("bucket '{name}' must be finite and >= 0, got {v}"));
            }
        }
        for (mode, m) in &self.multipliers {
            if !m.is_finite() || *m < 0.0 {
                return Err(format!(
                    "multiplier for mode '{mode}' must be finite and >= 0, got {m}"
                ));
            }
        }
        for (action, bucket) in &self.actions {
            if Bucket::from_name(bucket).is_none() {
                return Err(format!(
                    "action '{action}' maps to unknown bucket '{bucket}'"
                ));
            }
        }
        Ok(())
    }
}

/// Reconcile an animation base duration against a measured narration
/// duration, then apply explicit per-beat overrides.
///
/// The order is load-bearing: `max(base, narration)` first, so narration is
/// never clipped implicitly; then the `min_duration` floor (which wins over a
/// shorter narration); then the `max_duration` ceiling (the only thing
/// allowed to clip narration, because the author asked for it).
pub fn reconcile(
    base: f64,
    narration: Option<f64>,
    min_duration: Option<f64>,
    max_duration: Option<f64>,
) -> f64 {
    let mut run_time = match narration {
        Some(n) => base.max(n),
        None => base,
    };
    if let Some(min) = min_duration {
        run_time = run_time.max(min);
    }
    if let Some(max) = max_duration {
        run_time = run_time.min(max);
    }
    run_time
}

#[cfg(test)]
#[path = "../../tests/unit/timing/model.rs"]
mod tests;
