use crate::schema::path::{SchemaError, SchemaErrors, SchemaPathElem};
use crate::storyboard::model::{BeatDef, StoryboardDef};

pub(crate) fn validate_storyboard(def: &StoryboardDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    if let Err(msg) = def.timing.validate() {
        errors.push(SchemaError::at(&[SchemaPathElem::Field("timing")], msg));
    }

    for (a, act) in def.acts.iter().enumerate() {
        let act_path = [SchemaPathElem::Field("acts"), SchemaPathElem::Index(a)];
        if act.title.is_empty() {
            errors.push(SchemaError::at(&act_path, "act title must be non-empty"));
        }
        for (s, shot) in act.shots.iter().enumerate() {
            for (b, beat) in shot.beats.iter().enumerate() {
                let beat_path = vec![
                    SchemaPathElem::Field("acts"),
                    SchemaPathElem::Index(a),
                    SchemaPathElem::Field("shots"),
                    SchemaPathElem::Index(s),
                    SchemaPathElem::Field("beats"),
                    SchemaPathElem::Index(b),
                ];
                validate_beat(beat, &beat_path, &mut errors);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_beat(beat: &BeatDef, path: &[SchemaPathElem], errors: &mut Vec<SchemaError>) {
    if beat.action.is_empty() {
        errors.push(SchemaError::at(path, "beat action must be non-empty"));
    }
    for (name, d) in [
        ("min_duration", beat.min_duration),
        ("max_duration", beat.max_duration),
    ] {
        if let Some(d) = d
            && (!d.is_finite() || d < 0.0)
        {
            errors.push(SchemaError::at(
                path,
                format!("{name} must be finite and >= 0, got {d}"),
            ));
        }
    }
    // Authoring min > max is ambiguous; reject it rather than guess a
    // precedence rule.
    if let (Some(min), Some(max)) = (beat.min_duration, beat.max_duration)
        && min > max
    {
        errors.push(SchemaError::at(
            path,
            format!("min_duration ({min}) must be <= max_duration ({max})"),
        ));
    }
    for (word, action) in &beat.bookmarks {
        if word.is_empty() || action.is_empty() {
            errors.push(SchemaError::at(
                path,
                "bookmark words and actions must be non-empty",
            ));
        }
    }
}
