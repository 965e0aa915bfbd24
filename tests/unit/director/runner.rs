use super::*;
use crate::event::model::Event;
use crate::event::source::ScriptedSource;
use crate::foundation::error::ScenecastError;
use crate::narration::backend::{FixedRateNarration, NarrationClip};
use crate::scene::model::{EventBindingDef, SceneConfig, SceneConfigDef, WidgetSpecDef};
use crate::scene::widget::{CallOutcome, Widget, WidgetFactory, WidgetRegistry};
use serde_json::json;
use std::sync::{Arc, Mutex};

type CallLog = Arc<Mutex<Vec<(String, String, BTreeMap<String, Value>)>>>;

struct RecordingWidget {
    name: String,
    log: CallLog,
}

impl Widget for RecordingWidget {
    fn show(&mut self, params: &BTreeMap<String, Value>) -> ScenecastResult<()> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), "show".to_owned(), params.clone()));
        Ok(())
    }

    fn hide(&mut self) -> ScenecastResult<()> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), "hide".to_owned(), BTreeMap::new()));
        Ok(())
    }

    fn call(
        &mut self,
        method: &str,
        params: &BTreeMap<String, Value>,
        _run_time: f64,
    ) -> ScenecastResult<CallOutcome> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), method.to_owned(), params.clone()));
        Ok(CallOutcome::Handled)
    }
}

struct RecordingFactory {
    log: CallLog,
}

impl WidgetFactory for RecordingFactory {
    fn create(&self, params: &BTreeMap<String, Value>) -> ScenecastResult<Box<dyn Widget>> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("anonymous")
            .to_owned();
        Ok(Box::new(RecordingWidget {
            name,
            log: self.log.clone(),
        }))
    }
}

struct FailingNarration;

impl NarrationBackend for FailingNarration {
    fn synthesize(
        &mut self,
        _text: &str,
        _language: &str,
        _voice: &str,
    ) -> ScenecastResult<Box<dyn NarrationClip>> {
        Err(ScenecastError::narration("tts backend offline"))
    }
}

fn widget_spec(name: &str) -> WidgetSpecDef {
    WidgetSpecDef {
        kind: "recording".to_owned(),
        params: BTreeMap::from([("name".to_owned(), json!(name))]),
    }
}

fn scene_for(log: &CallLog, def: SceneConfigDef) -> SceneEngine {
    let mut registry = WidgetRegistry::new();
    registry.register(
        "recording",
        Box::new(RecordingFactory { log: log.clone() }),
    );
    SceneEngine::new(&SceneConfig::from_def(def), registry).unwrap()
}

/// Scene with one widget `w` reacting to `visit` events.
fn visit_scene(log: &CallLog) -> SceneEngine {
    scene_for(
        log,
        SceneConfigDef {
            widgets: BTreeMap::from([("w".to_owned(), widget_spec("w"))]),
            event_bindings: BTreeMap::from([(
                "visit".to_owned(),
                vec![EventBindingDef {
                    widget: "w".to_owned(),
                    action: "mark".to_owned(),
                    params: BTreeMap::from([("id".to_owned(), json!("${event.payload.node}"))]),
                    order: 1,
                    condition: None,
                }],
            )]),
            actions: BTreeMap::new(),
            parameters: BTreeMap::new(),
        },
    )
}

fn beat(action: &str) -> BeatDef {
    BeatDef {
        action: action.to_owned(),
        args: BTreeMap::new(),
        narration: None,
        bookmarks: BTreeMap::new(),
        min_duration: None,
        max_duration: None,
    }
}

/// Timing with zeroed transitions so run-time assertions stay simple.
fn flat_timing() -> TimingConfig {
    TimingConfig {
        ui: 1.0,
        events: 0.5,
        effects: 0.0,
        waits: 2.0,
        ..Default::default()
    }
}

fn storyboard_with(beats: Vec<BeatDef>, narration: NarrationDef) -> Storyboard {
    Storyboard::from_def(StoryboardDef {
        title: String::new(),
        acts: vec![ActDef {
            title: "Act one".to_owned(),
            shots: vec![ShotDef {
                widgets: Vec::new(),
                beats,
            }],
        }],
        timing: flat_timing(),
        narration,
    })
}

fn calls(log: &CallLog) -> Vec<(String, String, BTreeMap<String, Value>)> {
    log.lock().unwrap().clone()
}

#[test]
fn empty_storyboard_finishes_with_no_output() {
    let log = CallLog::default();
    let sb = Storyboard::from_def(StoryboardDef::default());
    let mut director =
        Director::new(sb, visit_scene(&log), Box::new(ScriptedSource::default()), None).unwrap();
    assert_eq!(director.state(), DirectorState::NotStarted);
    let stats = director.run().unwrap();
    assert_eq!(director.state(), DirectorState::Finished);
    assert_eq!(stats.beats_run, 0);
    assert!(calls(&log).is_empty());
}

#[test]
fn play_events_streams_the_trace_through_the_scene() {
    let log = CallLog::default();
    let trace = vec![
        Event::new("visit", 0).with("node", json!("A")),
        Event::new("visit", 1).with("node", json!("B")),
    ];
    let sb = storyboard_with(
        vec![beat("play_events"), beat("outro")],
        NarrationDef::default(),
    );
    let mut director = Director::new(
        sb,
        visit_scene(&log),
        Box::new(ScriptedSource::new(trace)),
        None,
    )
    .unwrap();
    let stats = director.run().unwrap();

    assert_eq!(stats.beats_run, 2);
    assert_eq!(stats.events_dispatched, 2);
    let recorded = calls(&log);
    assert_eq!(recorded.len(), 3);
    assert_eq!(recorded[0].1, "mark");
    assert_eq!(recorded[0].2["id"], json!("A"));
    assert_eq!(recorded[1].1, "mark");
    assert_eq!(recorded[1].2["id"], json!("B"));
    // The outro beat tears the widget down.
    assert_eq!(recorded[2].1, "hide");
}

#[test]
fn unknown_action_fails_with_address_and_alternatives() {
    let log = CallLog::default();
    let scene = scene_for(
        &log,
        SceneConfigDef {
            widgets: BTreeMap::from([("w".to_owned(), widget_spec("w"))]),
            event_bindings: BTreeMap::new(),
            actions: BTreeMap::from([(
                "pulse".to_owned(),
                vec![EventBindingDef {
                    widget: "w".to_owned(),
                    action: "pulse".to_owned(),
                    params: BTreeMap::new(),
                    order: 1,
                    condition: None,
                }],
            )]),
            parameters: BTreeMap::new(),
        },
    );
    let sb = storyboard_with(vec![beat("warp_speed")], NarrationDef::default());
    let mut director =
        Director::new(sb, scene, Box::new(ScriptedSource::default()), None).unwrap();
    let err = director.run().unwrap_err();
    assert_eq!(director.state(), DirectorState::Failed);
    match err {
        ScenecastError::UnknownAction {
            address,
            action,
            available,
        } => {
            assert_eq!((address.act, address.shot, address.beat), (0, 0, 0));
            assert_eq!(action, "warp_speed");
            assert!(available.iter().any(|a| a == "play_events"));
            assert!(available.iter().any(|a| a == "pulse"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn scene_actions_are_reachable_from_beats() {
    let log = CallLog::default();
    let scene = scene_for(
        &log,
        SceneConfigDef {
            widgets: BTreeMap::from([("w".to_owned(), widget_spec("w"))]),
            event_bindings: BTreeMap::new(),
            actions: BTreeMap::from([(
                "pulse".to_owned(),
                vec![EventBindingDef {
                    widget: "w".to_owned(),
                    action: "pulse".to_owned(),
                    params: BTreeMap::from([("node".to_owned(), json!("${args.node}"))]),
                    order: 1,
                    condition: None,
                }],
            )]),
            parameters: BTreeMap::new(),
        },
    );
    let mut b = beat("pulse");
    b.args.insert("node".to_owned(), json!("C"));
    let sb = storyboard_with(vec![b], NarrationDef::default());
    let mut director =
        Director::new(sb, scene, Box::new(ScriptedSource::default()), None).unwrap();
    director.run().unwrap();
    let recorded = calls(&log);
    assert_eq!(recorded.len(), 2); // pulse, then shot-exit hide
    assert_eq!(recorded[0].1, "pulse");
    assert_eq!(recorded[0].2["node"], json!("C"));
}

#[test]
fn wait_beat_accumulates_the_waits_bucket() {
    let log = CallLog::default();
    let sb = storyboard_with(vec![beat("wait")], NarrationDef::default());
    let mut director =
        Director::new(sb, visit_scene(&log), Box::new(ScriptedSource::default()), None).unwrap();
    let stats = director.run().unwrap();
    assert_eq!(stats.total_run_time_secs, 2.0);
}

#[test]
fn narration_extends_the_beat_run_time() {
    let log = CallLog::default();
    let mut b = beat("wait");
    b.narration = Some("one two three".to_owned());
    let sb = storyboard_with(
        vec![b],
        NarrationDef {
            enabled: true,
            ..Default::default()
        },
    );
    let mut director = Director::new(
        sb,
        visit_scene(&log),
        Box::new(ScriptedSource::default()),
        // 60 words per minute: one second per word.
        Some(Box::new(FixedRateNarration::new(60.0))),
    )
    .unwrap();
    let stats = director.run().unwrap();
    assert_eq!(stats.narrated_beats, 1);
    // Narration (3s) outlasts the waits bucket (2s).
    assert_eq!(stats.total_run_time_secs, 3.0);
}

#[test]
fn max_duration_clips_narration_when_authored() {
    let log = CallLog::default();
    let mut b = beat("wait");
    b.narration = Some("one two three".to_owned());
    b.max_duration = Some(2.5);
    let sb = storyboard_with(
        vec![b],
        NarrationDef {
            enabled: true,
            ..Default::default()
        },
    );
    let mut director = Director::new(
        sb,
        visit_scene(&log),
        Box::new(ScriptedSource::default()),
        Some(Box::new(FixedRateNarration::new(60.0))),
    )
    .unwrap();
    let stats = director.run().unwrap();
    assert_eq!(stats.total_run_time_secs, 2.5);
}

#[test]
fn disabled_narration_never_invokes_the_backend() {
    let log = CallLog::default();
    let mut b = beat("wait");
    b.narration = Some("spoken text that must be ignored".to_owned());
    let sb = storyboard_with(vec![b], NarrationDef::default());
    let mut director = Director::new(
        sb,
        visit_scene(&log),
        Box::new(ScriptedSource::default()),
        // A failing backend proves it is never called when disabled.
        Some(Box::new(FailingNarration)),
    )
    .unwrap();
    let stats = director.run().unwrap();
    assert_eq!(stats.narrated_beats, 0);
    assert_eq!(stats.total_run_time_secs, 2.0);
}

#[test]
fn narration_failure_falls_back_to_base_timing() {
    let log = CallLog::default();
    let mut b = beat("wait");
    b.narration = Some("this will not synthesize".to_owned());
    let sb = storyboard_with(
        vec![b],
        NarrationDef {
            enabled: true,
            ..Default::default()
        },
    );
    let mut director = Director::new(
        sb,
        visit_scene(&log),
        Box::new(ScriptedSource::default()),
        Some(Box::new(FailingNarration)),
    )
    .unwrap();
    let stats = director.run().unwrap();
    assert_eq!(director.state(), DirectorState::Finished);
    assert_eq!(stats.narrated_beats, 0);
    assert_eq!(stats.total_run_time_secs, 2.0);
}

#[test]
fn show_title_feeds_the_title_widget() {
    let log = CallLog::default();
    let scene = scene_for(
        &log,
        SceneConfigDef {
            widgets: BTreeMap::from([("title".to_owned(), widget_spec("title"))]),
            ..Default::default()
        },
    );
    let mut b = beat("show_title");
    b.args.insert("text".to_owned(), json!("Breadth-first search"));
    let sb = storyboard_with(vec![b], NarrationDef::default());
    let mut director =
        Director::new(sb, scene, Box::new(ScriptedSource::default()), None).unwrap();
    director.run().unwrap();
    let recorded = calls(&log);
    assert_eq!(recorded[0].0, "title");
    assert_eq!(recorded[0].1, "show");
    assert_eq!(recorded[0].2["text"], json!("Breadth-first search"));
}

#[test]
fn show_widgets_uses_the_shot_declaration() {
    let log = CallLog::default();
    let scene = scene_for(
        &log,
        SceneConfigDef {
            widgets: BTreeMap::from([
                ("grid".to_owned(), widget_spec("grid")),
                ("queue".to_owned(), widget_spec("queue")),
            ]),
            ..Default::default()
        },
    );
    let sb = Storyboard::from_def(StoryboardDef {
        title: String::new(),
        acts: vec![ActDef {
            title: "Act".to_owned(),
            shots: vec![ShotDef {
                widgets: vec!["grid".to_owned()],
                beats: vec![beat("show_widgets")],
            }],
        }],
        timing: flat_timing(),
        narration: NarrationDef::default(),
    });
    let mut director =
        Director::new(sb, scene, Box::new(ScriptedSource::default()), None).unwrap();
    director.run().unwrap();
    let recorded = calls(&log);
    let shown: Vec<&str> = recorded
        .iter()
        .filter(|(_, m, _)| m == "show")
        .map(|(w, _, _)| w.as_str())
        .collect();
    assert_eq!(shown, vec!["grid"]);
}

#[test]
fn stop_handle_aborts_at_the_next_beat_boundary() {
    let log = CallLog::default();
    let sb = storyboard_with(vec![beat("wait"), beat("wait")], NarrationDef::default());
    let mut director =
        Director::new(sb, visit_scene(&log), Box::new(ScriptedSource::default()), None).unwrap();
    director.stop_handle().stop();
    let stats = director.run().unwrap();
    assert!(stats.stopped);
    assert_eq!(stats.beats_run, 0);
    assert_eq!(director.state(), DirectorState::Finished);
}

#[test]
fn run_may_only_be_called_once() {
    let log = CallLog::default();
    let sb = storyboard_with(vec![beat("wait")], NarrationDef::default());
    let mut director =
        Director::new(sb, visit_scene(&log), Box::new(ScriptedSource::default()), None).unwrap();
    director.run().unwrap();
    assert!(director.run().is_err());
}

#[test]
fn invalid_storyboard_is_rejected_at_construction() {
    let log = CallLog::default();
    let mut b = beat("wait");
    b.min_duration = Some(5.0);
    b.max_duration = Some(2.0);
    let sb = storyboard_with(vec![b], NarrationDef::default());
    assert!(
        Director::new(sb, visit_scene(&log), Box::new(ScriptedSource::default()), None).is_err()
    );
}
