use crate::scene::model::{EventBindingDef, SceneConfigDef};
use crate::schema::path::{SchemaError, SchemaErrors, SchemaPathElem};
use crate::template::engine::CompiledValue;
use crate::template::parser::parse_condition;
use serde_json::Value;

pub(crate) fn validate_scene(def: &SceneConfigDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    for (name, spec) in &def.widgets {
        let path = [
            SchemaPathElem::Field("widgets"),
            SchemaPathElem::Key(name.clone()),
        ];
        if name.is_empty() {
            errors.push(SchemaError::at(&path, "widget name must be non-empty"));
        }
        if spec.kind.is_empty() {
            errors.push(SchemaError::at(&path, "widget type must be non-empty"));
        }
    }

    validate_binding_map(def, "event_bindings", &def.event_bindings, &mut errors);
    validate_binding_map(def, "actions", &def.actions, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_binding_map(
    def: &SceneConfigDef,
    field: &'static str,
    map: &std::collections::BTreeMap<String, Vec<EventBindingDef>>,
    errors: &mut Vec<SchemaError>,
) {
    for (key, bindings) in map {
        for (i, binding) in bindings.iter().enumerate() {
            let path = vec![
                SchemaPathElem::Field(field),
                SchemaPathElem::Key(key.clone()),
                SchemaPathElem::Index(i),
            ];
            if !def.widgets.contains_key(&binding.widget) {
                errors.push(SchemaError::at(
                    &path,
                    format!(
                        "binding for '{key}' references unknown widget '{}'",
                        binding.widget
                    ),
                ));
            }
            if binding.action.is_empty() {
                errors.push(SchemaError::at(&path, "binding action must be non-empty"));
            }
            for (param, value) in &binding.params {
                if let Err(e) = check_templates(value) {
                    let mut p = path.clone();
                    p.push(SchemaPathElem::Field("params"));
                    p.push(SchemaPathElem::Key(param.clone()));
                    errors.push(SchemaError::at(&p, e));
                }
            }
            if let Some(cond) = &binding.condition
                && let Err(e) = parse_condition(cond)
            {
                let mut p = path.clone();
                p.push(SchemaPathElem::Field("condition"));
                errors.push(SchemaError::at(&p, e.to_string()));
            }
        }
    }
}

fn check_templates(value: &Value) -> Result<(), String> {
    CompiledValue::compile_raw(value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
