//! Declarative event-to-action routing.
//!
//! The engine front-loads all validation and template compilation at
//! construction, so dispatch is a table walk: look up the event type, gate
//! each binding on its condition, resolve parameters, invoke the widget
//! method. Per-binding failures skip that binding only; one broken visual
//! reaction never halts the narration/visual pipeline.

use crate::event::model::Event;
use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::scene::model::{EventBindingDef, SceneConfig, WidgetSpecDef};
use crate::scene::widget::{CallOutcome, Widget, WidgetRegistry};
use crate::template::engine::{CompiledCondition, CompiledParams, Context};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

struct CompiledBinding {
    widget: String,
    method: String,
    params: CompiledParams,
    condition: Option<CompiledCondition>,
    order: i32,
}

/// Owns widget lifecycle and routes events to widget method calls through
/// the bindings of a [`SceneConfig`].
pub struct SceneEngine {
    specs: BTreeMap<String, WidgetSpecDef>,
    /// Event type name to bindings, pre-sorted by `(order, declaration)`.
    bindings: BTreeMap<String, Vec<CompiledBinding>>,
    actions: BTreeMap<String, Vec<CompiledBinding>>,
    parameters: Value,
    registry: WidgetRegistry,
    /// Widget instances scoped to the currently active shot. The only
    /// mutable per-shot state in the core.
    live: BTreeMap<String, Box<dyn Widget>>,
}

impl std::fmt::Debug for SceneEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEngine")
            .field("specs", &self.specs)
            .field("bindings", &self.bindings.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("parameters", &self.parameters)
            .field("live", &self.live.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SceneEngine {
    /// Build an engine from a scene configuration and an injected registry.
    ///
    /// Fails fast: dangling widget references, unknown widget types, and
    /// malformed templates or conditions are configuration errors here, not
    /// at first dispatch. No widget is instantiated eagerly.
    pub fn new(config: &SceneConfig, registry: WidgetRegistry) -> ScenecastResult<Self> {
        config.validate()?;
        let def = config.def();

        for (name, spec) in &def.widgets {
            if registry.get(&spec.kind).is_none() {
                return Err(ScenecastError::configuration(format!(
                    "widget '{name}' has unknown type '{}' (not in the registry)",
                    spec.kind
                )));
            }
        }

        let bindings = compile_binding_map(&def.event_bindings, &def.widgets, &registry)?;
        let actions = compile_binding_map(&def.actions, &def.widgets, &registry)?;

        Ok(Self {
            specs: def.widgets.clone(),
            bindings,
            actions,
            parameters: Value::Object(
                def.parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            registry,
            live: BTreeMap::new(),
        })
    }

    /// True when the configuration declares a widget instance named `name`.
    pub fn has_widget(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Create (if needed) and show one widget, passing `params` to `show`.
    pub fn show_widget(
        &mut self,
        name: &str,
        params: &BTreeMap<String, Value>,
    ) -> ScenecastResult<()> {
        let Self {
            specs,
            registry,
            live,
            ..
        } = self;
        let widget = ensure_widget(live, specs, registry, name)?;
        widget.show(params)
    }

    /// Create and show the widgets a shot needs.
    ///
    /// An empty `names` slice means every configured widget. Widgets are
    /// created lazily here rather than at engine construction, bounding
    /// per-shot memory and animation state.
    pub fn initialize_widgets_for_shot(&mut self, names: &[String]) -> ScenecastResult<()> {
        let names: Vec<String> = if names.is_empty() {
            self.specs.keys().cloned().collect()
        } else {
            names.to_vec()
        };
        for name in &names {
            self.show_widget(name, &BTreeMap::new())?;
        }
        Ok(())
    }

    /// Hide and tear down every live widget at shot end.
    ///
    /// Teardown failures are logged and do not fail the run.
    pub fn cleanup_widgets_for_shot(&mut self) {
        let live = std::mem::take(&mut self.live);
        for (name, mut widget) in live {
            if let Err(e) = widget.hide() {
                tracing::warn!(widget = %name, error = %e, "widget hide failed during shot cleanup");
            }
        }
    }

    /// Route one event through its bindings, in order.
    ///
    /// An event type with no bindings is a no-op, not an error: unbound
    /// event types are expected and normal. `run_time` is the per-event
    /// budget computed from the `events` timing bucket.
    pub fn handle_event(&mut self, event: &Event, run_time: f64) -> ScenecastResult<()> {
        let ctx = Context::new()
            .with("event", event.to_value())
            .with("config", self.parameters.clone());
        let Self {
            bindings,
            specs,
            registry,
            live,
            ..
        } = self;
        let Some(list) = bindings.get(&event.kind) else {
            tracing::debug!(event_type = %event.kind, "no bindings for event type");
            return Ok(());
        };
        run_bindings(list, &ctx, run_time, specs, registry, live)
    }

    /// True when the configuration defines `name` as a scene action.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Names of all scene-configured actions, for error reporting.
    pub fn action_names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    /// Execute a scene-configured action: an ordered list of widget calls
    /// resolved against the context `{args, config}`.
    pub fn execute_action(
        &mut self,
        name: &str,
        args: &BTreeMap<String, Value>,
        run_time: f64,
    ) -> ScenecastResult<()> {
        let ctx = Context::new()
            .with(
                "args",
                Value::Object(args.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            )
            .with("config", self.parameters.clone());
        let Self {
            actions,
            specs,
            registry,
            live,
            ..
        } = self;
        let Some(list) = actions.get(name) else {
            return Err(ScenecastError::configuration(format!(
                "scene action '{name}' is not defined"
            )));
        };
        tracing::debug!(action = name, run_time, "executing scene action");
        run_bindings(list, &ctx, run_time, specs, registry, live)
    }
}

fn compile_binding_map(
    map: &BTreeMap<String, Vec<EventBindingDef>>,
    widgets: &BTreeMap<String, WidgetSpecDef>,
    registry: &WidgetRegistry,
) -> ScenecastResult<BTreeMap<String, Vec<CompiledBinding>>> {
    let mut out = BTreeMap::new();
    for (key, defs) in map {
        let mut compiled = Vec::with_capacity(defs.len());
        for def in defs {
            let params = CompiledParams::compile(&def.params)?;
            let condition = def
                .condition
                .as_deref()
                .map(CompiledCondition::compile)
                .transpose()?;
            if let Some(spec) = widgets.get(&def.widget)
                && let Some(factory) = registry.get(&spec.kind)
            {
                let methods = factory.methods();
                if !methods.is_empty() && !methods.contains(&def.action.as_str()) {
                    tracing::warn!(
                        binding = %key,
                        widget = %def.widget,
                        method = %def.action,
                        "bound method is not advertised by the widget type"
                    );
                }
            }
            compiled.push(CompiledBinding {
                widget: def.widget.clone(),
                method: def.action.clone(),
                params,
                condition,
                order: def.order,
            });
        }
        // Stable sort: equal orders keep declaration order.
        compiled.sort_by_key(|b| b.order);
        out.insert(key.clone(), compiled);
    }
    Ok(out)
}

fn run_bindings(
    list: &[CompiledBinding],
    ctx: &Context,
    run_time: f64,
    specs: &BTreeMap<String, WidgetSpecDef>,
    registry: &WidgetRegistry,
    live: &mut BTreeMap<String, Box<dyn Widget>>,
) -> ScenecastResult<()> {
    for binding in list {
        if let Some(cond) = &binding.condition
            && !cond.is_satisfied(ctx)
        {
            tracing::debug!(
                widget = %binding.widget,
                method = %binding.method,
                "condition not satisfied, skipping binding"
            );
            continue;
        }
        let Some(params) = binding.params.resolve(ctx) else {
            tracing::warn!(
                widget = %binding.widget,
                method = %binding.method,
                "unresolved template parameter, skipping binding"
            );
            continue;
        };
        let widget = ensure_widget(live, specs, registry, &binding.widget)?;
        match widget.call(&binding.method, &params, run_time) {
            Ok(CallOutcome::Handled) => {}
            Ok(CallOutcome::UnknownMethod) => {
                tracing::warn!(
                    widget = %binding.widget,
                    method = %binding.method,
                    "widget does not expose method, skipping binding"
                );
            }
            Err(e) => {
                tracing::warn!(
                    widget = %binding.widget,
                    method = %binding.method,
                    error = %e,
                    "binding execution failed, skipping"
                );
            }
        }
    }
    Ok(())
}

fn ensure_widget<'a>(
    live: &'a mut BTreeMap<String, Box<dyn Widget>>,
    specs: &BTreeMap<String, WidgetSpecDef>,
    registry: &WidgetRegistry,
    name: &str,
) -> ScenecastResult<&'a mut Box<dyn Widget>> {
    match live.entry(name.to_owned()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(slot) => {
            let spec = specs.get(name).ok_or_else(|| {
                ScenecastError::widget(format!(
                    "widget '{name}' has no configuration; construction-time validation should have caught this"
                ))
            })?;
            let factory = registry.get(&spec.kind).ok_or_else(|| {
                ScenecastError::widget(format!("widget type '{}' is not registered", spec.kind))
            })?;
            let instance = factory.create(&spec.params)?;
            tracing::debug!(widget = name, kind = %spec.kind, "created widget");
            Ok(slot.insert(instance))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/engine.rs"]
mod tests;
