//! The storyboard interpreter.
//!
//! Execution is single-threaded, sequential, and cooperative: one beat runs
//! fully (including any narration synthesis wait) before the next begins.
//! Visual and narrative ordering correctness depends on that strict
//! sequencing, so nothing here is concurrent; the only external control is a
//! stop flag checked at beat boundaries.

use crate::event::source::EventSource;
use crate::foundation::core::BeatAddress;
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::narration::backend::NarrationBackend;
use crate::scene::engine::SceneEngine;
use crate::storyboard::model::{ActDef, BeatDef, NarrationDef, ShotDef, Storyboard, StoryboardDef};
use crate::timing::model::{Bucket, TimingConfig, reconcile};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Actions the director handles without delegating to the scene engine.
const GENERIC_ACTIONS: [&str; 5] = [
    "show_title",
    "show_widgets",
    "play_events",
    "wait",
    "outro",
];

/// Lifecycle state of a director run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorState {
    /// `run()` has not been called yet.
    NotStarted,
    /// Iterating acts.
    RunningAct,
    /// Iterating shots within an act.
    RunningShot,
    /// Executing a beat.
    RunningBeat,
    /// The storyboard completed (or was gracefully stopped).
    Finished,
    /// The run aborted on an unrecoverable error.
    Failed,
}

/// Cooperative stop signal, checked at beat boundaries only.
///
/// Cloneable and sendable to other threads; there is no mid-beat preemption.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request a graceful abort at the next beat boundary.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    /// Acts executed to completion.
    pub acts_run: u64,
    /// Shots executed to completion.
    pub shots_run: u64,
    /// Beats executed.
    pub beats_run: u64,
    /// Events pulled from the producer and dispatched.
    pub events_dispatched: u64,
    /// Beats that ran with synthesized narration.
    pub narrated_beats: u64,
    /// Accumulated run time over beats and transitions, seconds.
    pub total_run_time_secs: f64,
    /// True when the run ended early via [`StopHandle::stop`].
    pub stopped: bool,
}

/// Interprets a [`Storyboard`], driving the scene engine, the event
/// producer, and the narration backend.
///
/// All collaborators are owned and injected explicitly; the director holds
/// no ambient global state.
pub struct Director {
    storyboard: Storyboard,
    scene: SceneEngine,
    source: Box<dyn EventSource>,
    narration: Option<Box<dyn NarrationBackend>>,
    state: DirectorState,
    stop: StopHandle,
    narration_warned: bool,
}

impl Director {
    /// Validate the storyboard and assemble a director over its
    /// collaborators. Passing `None` for `narration` disables narration
    /// entirely; every beat then runs at its animation base duration.
    pub fn new(
        storyboard: Storyboard,
        scene: SceneEngine,
        source: Box<dyn EventSource>,
        narration: Option<Box<dyn NarrationBackend>>,
    ) -> ScenecastResult<Self> {
        storyboard.validate()?;
        Ok(Self {
            storyboard,
            scene,
            source,
            narration,
            state: DirectorState::NotStarted,
            stop: StopHandle(Arc::new(AtomicBool::new(false))),
            narration_warned: false,
        })
    }

    /// Handle for requesting a graceful stop, e.g. from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DirectorState {
        self.state
    }

    /// Execute the storyboard from the top.
    ///
    /// Runs every act, shot, and beat in order, then returns the run's
    /// counters. Fatal errors carry the full act/shot/beat context.
    pub fn run(&mut self) -> ScenecastResult<RunStats> {
        if self.state != DirectorState::NotStarted {
            return Err(ScenecastError::configuration(
                "director run() may only be called once",
            ));
        }
        let def = self.storyboard.def().clone();
        let mut stats = RunStats::default();
        match self.run_acts(&def, &mut stats) {
            Ok(()) => {
                self.state = DirectorState::Finished;
                tracing::info!(
                    acts = stats.acts_run,
                    beats = stats.beats_run,
                    events = stats.events_dispatched,
                    total_secs = stats.total_run_time_secs,
                    "run finished"
                );
                Ok(stats)
            }
            Err(e) => {
                self.state = DirectorState::Failed;
                self.scene.cleanup_widgets_for_shot();
                tracing::error!(error = %e, "run failed");
                Err(e)
            }
        }
    }

    fn run_acts(&mut self, def: &StoryboardDef, stats: &mut RunStats) -> ScenecastResult<()> {
        'acts: for (act_idx, act) in def.acts.iter().enumerate() {
            self.state = DirectorState::RunningAct;
            let span = tracing::info_span!("act", index = act_idx, title = %act.title);
            let _guard = span.enter();
            tracing::info!("act enter");
            stats.total_run_time_secs += def.timing.scaled(Bucket::Effects);

            for (shot_idx, shot) in act.shots.iter().enumerate() {
                self.state = DirectorState::RunningShot;
                tracing::debug!(shot = shot_idx, "shot enter");

                for (beat_idx, beat) in shot.beats.iter().enumerate() {
                    if self.stop.is_stopped() {
                        tracing::info!("stop requested, aborting at beat boundary");
                        stats.stopped = true;
                        self.scene.cleanup_widgets_for_shot();
                        break 'acts;
                    }
                    self.state = DirectorState::RunningBeat;
                    let address = BeatAddress {
                        act: act_idx,
                        shot: shot_idx,
                        beat: beat_idx,
                    };
                    self.run_beat(address, beat, act, shot, def, stats)?;
                    stats.beats_run += 1;
                }

                self.scene.cleanup_widgets_for_shot();
                tracing::debug!(shot = shot_idx, "shot exit");
                stats.shots_run += 1;
            }

            stats.total_run_time_secs += def.timing.scaled(Bucket::Effects);
            tracing::info!("act exit");
            stats.acts_run += 1;
        }
        Ok(())
    }

    fn run_beat(
        &mut self,
        address: BeatAddress,
        beat: &BeatDef,
        act: &ActDef,
        shot: &ShotDef,
        def: &StoryboardDef,
        stats: &mut RunStats,
    ) -> ScenecastResult<()> {
        let base = def.timing.base_for(&beat.action);
        let narration = self.narrate(beat, &def.narration);
        if narration.is_some() {
            stats.narrated_beats += 1;
        }
        let run_time = reconcile(base, narration, beat.min_duration, beat.max_duration);
        tracing::debug!(action = %beat.action, base, run_time, "beat");
        self.dispatch_action(address, beat, act, shot, &def.timing, stats, run_time)?;
        stats.total_run_time_secs += run_time;
        Ok(())
    }

    /// Synthesize the beat's narration, if enabled, and return its measured
    /// duration. Failures degrade to base timing with a one-time warning.
    fn narrate(&mut self, beat: &BeatDef, cfg: &NarrationDef) -> Option<f64> {
        if !cfg.enabled {
            return None;
        }
        let text = beat.narration.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        let backend = self.narration.as_deref_mut()?;
        match backend.synthesize(text, &cfg.language, &cfg.voice) {
            Ok(clip) => {
                let duration = clip.duration_secs();
                register_bookmarks(text, &beat.bookmarks);
                // The clip handle drops here, releasing the synthesis scope.
                Some(duration)
            }
            Err(e) => {
                if !self.narration_warned {
                    self.narration_warned = true;
                    tracing::warn!(error = %e, "narration backend failed; continuing with base timing");
                }
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_action(
        &mut self,
        address: BeatAddress,
        beat: &BeatDef,
        act: &ActDef,
        shot: &ShotDef,
        timing: &TimingConfig,
        stats: &mut RunStats,
        run_time: f64,
    ) -> ScenecastResult<()> {
        match beat.action.as_str() {
            "show_title" => self.show_title(beat, act, run_time),
            "show_widgets" => self.show_widgets(beat, shot),
            "play_events" => self.play_events(beat, timing, stats),
            "wait" => Ok(()),
            "outro" => self.outro(beat),
            other => {
                if self.scene.has_action(other) {
                    self.scene.execute_action(other, &beat.args, run_time)
                } else {
                    let mut available: Vec<String> =
                        GENERIC_ACTIONS.iter().map(|s| (*s).to_owned()).collect();
                    available.extend(self.scene.action_names());
                    Err(ScenecastError::UnknownAction {
                        address,
                        action: other.to_owned(),
                        available,
                    })
                }
            }
        }
    }

    /// Show the beat's `text` argument, or the act title, through the
    /// configured `title` widget when one exists.
    fn show_title(&mut self, beat: &BeatDef, act: &ActDef, run_time: f64) -> ScenecastResult<()> {
        let text = beat
            .args
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or(&act.title)
            .to_owned();
        tracing::info!(title = %text, run_time, "show title");
        if self.scene.has_widget("title") {
            let params = BTreeMap::from([("text".to_owned(), Value::String(text))]);
            self.scene.show_widget("title", &params)?;
        }
        Ok(())
    }

    /// Bring the shot's widgets on screen. A `widgets` array argument on the
    /// beat overrides the shot's declared list.
    fn show_widgets(&mut self, beat: &BeatDef, shot: &ShotDef) -> ScenecastResult<()> {
        let names: Vec<String> = match beat.args.get("widgets") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => shot.widgets.clone(),
        };
        self.scene.initialize_widgets_for_shot(&names)
    }

    /// Stream the producer's events through the scene engine, one at a time.
    fn play_events(
        &mut self,
        beat: &BeatDef,
        timing: &TimingConfig,
        stats: &mut RunStats,
    ) -> ScenecastResult<()> {
        let scenario = beat.args.get("scenario").cloned().unwrap_or(Value::Null);
        let per_event = timing.scaled(Bucket::Events);
        let scene = &mut self.scene;
        let stream = self.source.events(&scenario)?;
        for event in stream {
            let event = event?;
            tracing::debug!(event_type = %event.kind, step = event.step_index.0, "event");
            scene.handle_event(&event, per_event)?;
            stats.events_dispatched += 1;
        }
        Ok(())
    }

    fn outro(&mut self, beat: &BeatDef) -> ScenecastResult<()> {
        match beat.args.get("text").and_then(Value::as_str) {
            Some(text) => tracing::info!(text, "outro"),
            None => tracing::info!("outro"),
        }
        self.scene.cleanup_widgets_for_shot();
        Ok(())
    }
}

/// Bookmark scaffold: report whether each bookmarked word occurs in the
/// narration text. No real-time callback wiring yet.
fn register_bookmarks(text: &str, bookmarks: &BTreeMap<String, String>) {
    for (word, action) in bookmarks {
        let found = text
            .split_whitespace()
            .any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).eq_ignore_ascii_case(word));
        if found {
            tracing::debug!(word = %word, action = %action, "bookmark word present in narration");
        } else {
            tracing::warn!(word = %word, action = %action, "bookmark word not found in narration text");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/director/runner.rs"]
mod tests;
