//! Compile-once, resolve-many value templates.
//!
//! Templates are compiled when a scene configuration is loaded, so malformed
//! expressions surface as configuration errors before any event is
//! dispatched. Resolution never fails: an unresolvable attribute path yields
//! [`Resolved::Absent`], which callers treat as "skip this binding".

use crate::foundation::error::{ScenecastError, ScenecastResult};
use crate::template::ast::{Builtin, CmpOp, Condition, Expr, Lit};
use crate::template::error::TemplateParseError;
use crate::template::parser::{parse_condition, parse_expr};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named value roots a template resolves against.
///
/// Event dispatch uses `{event, config}`; scene action execution uses
/// `{args, config}`.
#[derive(Debug, Clone, Default)]
pub struct Context {
    roots: BTreeMap<String, Value>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root, builder style.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.roots.insert(name.into(), value);
        self
    }

    /// Add a root in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.roots.insert(name.into(), value);
    }

    fn root(&self, name: &str) -> Option<&Value> {
        self.roots.get(name)
    }
}

/// Outcome of resolving a template against a context.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The template resolved to a concrete value.
    Value(Value),
    /// Some attribute path segment was missing from the context.
    ///
    /// This is the well-defined sentinel for resolution failure. It is an
    /// expected condition, not an error: the scene engine reacts by skipping
    /// the owning binding.
    Absent,
}

impl Resolved {
    /// Convert to an `Option`, mapping `Absent` to `None`.
    pub fn into_option(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone)]
enum Repr {
    Literal(Value),
    /// The whole value is one `${expr}`; resolution is type-preserving.
    Expr(Expr),
    /// Inline `${...}` occurrences; resolution coerces to a string.
    Segments(Vec<Segment>),
    Array(Vec<CompiledValue>),
    Object(BTreeMap<String, CompiledValue>),
}

/// One params value compiled at configuration time.
#[derive(Debug, Clone)]
pub struct CompiledValue {
    repr: Repr,
}

impl CompiledValue {
    /// Compile a raw value, parsing any `${...}` templates it contains.
    /// Non-string scalars pass through as literals; arrays and objects are
    /// compiled recursively.
    pub fn compile(value: &Value) -> ScenecastResult<Self> {
        Self::compile_raw(value).map_err(|e| ScenecastError::configuration(e.to_string()))
    }

    pub(crate) fn compile_raw(value: &Value) -> Result<Self, TemplateParseError> {
        let repr = match value {
            Value::String(s) => compile_string(s)?,
            Value::Array(items) => Repr::Array(
                items
                    .iter()
                    .map(Self::compile_raw)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Object(map) => Repr::Object(
                map.iter()
                    .map(|(k, v)| Self::compile_raw(v).map(|c| (k.clone(), c)))
                    .collect::<Result<BTreeMap<_, _>, _>>()?,
            ),
            other => Repr::Literal(other.clone()),
        };
        Ok(Self { repr })
    }

    /// Resolve against a context. Whole-value templates preserve the resolved
    /// value's type; inline segments produce a string.
    pub fn resolve(&self, ctx: &Context) -> Resolved {
        match &self.repr {
            Repr::Literal(v) => Resolved::Value(v.clone()),
            Repr::Expr(expr) => eval_expr(expr, ctx),
            Repr::Segments(segments) => {
                let mut out = String::new();
                for seg in segments {
                    match seg {
                        Segment::Text(t) => out.push_str(t),
                        Segment::Expr(expr) => match eval_expr(expr, ctx) {
                            Resolved::Value(v) => out.push_str(&coerce_display(&v)),
                            Resolved::Absent => return Resolved::Absent,
                        },
                    }
                }
                Resolved::Value(Value::String(out))
            }
            Repr::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.resolve(ctx) {
                        Resolved::Value(v) => out.push(v),
                        Resolved::Absent => return Resolved::Absent,
                    }
                }
                Resolved::Value(Value::Array(out))
            }
            Repr::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, item) in map {
                    match item.resolve(ctx) {
                        Resolved::Value(v) => {
                            out.insert(k.clone(), v);
                        }
                        Resolved::Absent => return Resolved::Absent,
                    }
                }
                Resolved::Value(Value::Object(out))
            }
        }
    }
}

fn compile_string(s: &str) -> Result<Repr, TemplateParseError> {
    let Some(first) = s.find("${") else {
        return Ok(Repr::Literal(Value::String(s.to_owned())));
    };

    let mut segments = Vec::new();
    let mut rest_offset;
    if first > 0 {
        segments.push(Segment::Text(s[..first].to_owned()));
    }
    let mut cursor = first;
    loop {
        let open = cursor;
        let Some(close_rel) = s[open..].find('}') else {
            return Err(TemplateParseError::new(open, "unclosed '${' in template"));
        };
        let close = open + close_rel;
        let inner = &s[open + 2..close];
        let expr =
            parse_expr(inner).map_err(|e| TemplateParseError::new(open + 2 + e.offset, e.message))?;
        segments.push(Segment::Expr(expr));
        rest_offset = close + 1;

        match s[rest_offset..].find("${") {
            Some(next_rel) => {
                let next = rest_offset + next_rel;
                if next > rest_offset {
                    segments.push(Segment::Text(s[rest_offset..next].to_owned()));
                }
                cursor = next;
            }
            None => break,
        }
    }
    if rest_offset < s.len() {
        segments.push(Segment::Text(s[rest_offset..].to_owned()));
    }

    // A single expression with no surrounding text is the type-preserving
    // whole-value form.
    if segments.len() == 1
        && let Segment::Expr(expr) = &segments[0]
    {
        return Ok(Repr::Expr(expr.clone()));
    }
    Ok(Repr::Segments(segments))
}

/// A params map compiled at configuration time.
#[derive(Debug, Clone, Default)]
pub struct CompiledParams {
    entries: BTreeMap<String, CompiledValue>,
}

impl CompiledParams {
    /// Compile every value in a params map.
    pub fn compile(params: &BTreeMap<String, Value>) -> ScenecastResult<Self> {
        let entries = params
            .iter()
            .map(|(k, v)| CompiledValue::compile(v).map(|c| (k.clone(), c)))
            .collect::<ScenecastResult<BTreeMap<_, _>>>()?;
        Ok(Self { entries })
    }

    /// Resolve every entry against a context.
    ///
    /// Returns `None` when any entry is absent; the owning binding is skipped
    /// rather than dispatched with a hole in its parameters.
    pub fn resolve(&self, ctx: &Context) -> Option<BTreeMap<String, Value>> {
        let mut out = BTreeMap::new();
        for (k, v) in &self.entries {
            match v.resolve(ctx) {
                Resolved::Value(v) => {
                    out.insert(k.clone(), v);
                }
                Resolved::Absent => {
                    tracing::debug!(param = %k, "template parameter is absent");
                    return None;
                }
            }
        }
        Some(out)
    }
}

/// A guard condition compiled at configuration time.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    cond: Condition,
    src: String,
}

impl CompiledCondition {
    /// Parse and compile a condition string such as
    /// `event.payload.weight >= 3`.
    pub fn compile(src: &str) -> ScenecastResult<Self> {
        let cond = parse_condition(src).map_err(|e| {
            ScenecastError::configuration(format!("condition '{src}': {e}"))
        })?;
        Ok(Self {
            cond,
            src: src.to_owned(),
        })
    }

    /// Evaluate against a context.
    ///
    /// Satisfied only when every operand resolves and the comparison holds.
    /// Comparison attempts numeric coercion of both operands first and falls
    /// back to string comparison.
    pub fn is_satisfied(&self, ctx: &Context) -> bool {
        match &self.cond {
            Condition::Compare { op, left, right } => {
                let (Resolved::Value(l), Resolved::Value(r)) =
                    (eval_expr(left, ctx), eval_expr(right, ctx))
                else {
                    tracing::debug!(condition = %self.src, "condition operand is absent");
                    return false;
                };
                compare(*op, &l, &r)
            }
            Condition::Truthy(expr) => matches!(eval_expr(expr, ctx), Resolved::Value(Value::Bool(true))),
        }
    }
}

/// One-shot compile-and-resolve of a whole params map.
///
/// Returns `Ok(None)` when any value is absent. Convenience wrapper over
/// [`CompiledParams`]; engine code compiles once and resolves per dispatch.
pub fn resolve_params(
    params: &BTreeMap<String, Value>,
    ctx: &Context,
) -> ScenecastResult<Option<BTreeMap<String, Value>>> {
    Ok(CompiledParams::compile(params)?.resolve(ctx))
}

fn eval_expr(expr: &Expr, ctx: &Context) -> Resolved {
    match expr {
        Expr::Lit(Lit::Number(n)) => Resolved::Value(number_value(*n)),
        Expr::Lit(Lit::Str(s)) => Resolved::Value(Value::String(s.clone())),
        Expr::Lit(Lit::Bool(b)) => Resolved::Value(Value::Bool(*b)),
        Expr::Path(segments) => lookup(ctx, segments),
        Expr::Call { func, args } => {
            let mut resolved = Vec::with_capacity(args.len());
            for arg in args {
                match eval_expr(arg, ctx) {
                    Resolved::Value(v) => resolved.push(v),
                    Resolved::Absent => return Resolved::Absent,
                }
            }
            apply_builtin(*func, &resolved)
        }
    }
}

fn lookup(ctx: &Context, segments: &[String]) -> Resolved {
    let Some((root, rest)) = segments.split_first() else {
        return Resolved::Absent;
    };
    let Some(mut current) = ctx.root(root) else {
        return Resolved::Absent;
    };
    for seg in rest {
        match current {
            Value::Object(map) => match map.get(seg) {
                Some(v) => current = v,
                None => return Resolved::Absent,
            },
            _ => return Resolved::Absent,
        }
    }
    Resolved::Value(current.clone())
}

fn apply_builtin(func: Builtin, args: &[Value]) -> Resolved {
    let absent = |why: &str| {
        tracing::debug!(func = func.name(), why, "builtin could not be applied");
        Resolved::Absent
    };
    match func {
        Builtin::Len => match &args[0] {
            Value::String(s) => Resolved::Value(Value::from(s.chars().count() as u64)),
            Value::Array(items) => Resolved::Value(Value::from(items.len() as u64)),
            Value::Object(map) => Resolved::Value(Value::from(map.len() as u64)),
            _ => absent("len expects a string, array, or object"),
        },
        Builtin::Str => Resolved::Value(Value::String(coerce_display(&args[0]))),
        Builtin::Int => match &args[0] {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Resolved::Value(Value::from(i)),
                None => match n.as_f64() {
                    Some(f) if f.is_finite() => Resolved::Value(Value::from(f.trunc() as i64)),
                    _ => absent("non-finite number"),
                },
            },
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Resolved::Value(Value::from(i)),
                Err(_) => match s.trim().parse::<f64>() {
                    Ok(f) if f.is_finite() => Resolved::Value(Value::from(f.trunc() as i64)),
                    _ => absent("string does not parse as a number"),
                },
            },
            Value::Bool(b) => Resolved::Value(Value::from(i64::from(*b))),
            _ => absent("int expects a number, string, or bool"),
        },
        Builtin::Float => match &args[0] {
            Value::Number(n) => match n.as_f64() {
                Some(f) => Resolved::Value(number_value(f)),
                None => absent("number is not representable as f64"),
            },
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Resolved::Value(number_value(f)),
                _ => absent("string does not parse as a number"),
            },
            _ => absent("float expects a number or string"),
        },
        Builtin::Abs => match &args[0] {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Resolved::Value(Value::from(i.saturating_abs()))
                } else {
                    match n.as_f64() {
                        Some(f) => Resolved::Value(number_value(f.abs())),
                        None => absent("number is not representable as f64"),
                    }
                }
            }
            _ => absent("abs expects a number"),
        },
        Builtin::Max | Builtin::Min => {
            let mut best: Option<(f64, &Value)> = None;
            for arg in args {
                let Some(f) = comparable_number(arg) else {
                    return absent("max/min expect numeric arguments");
                };
                let better = match best {
                    None => true,
                    Some((b, _)) => {
                        if func == Builtin::Max {
                            f > b
                        } else {
                            f < b
                        }
                    }
                };
                if better {
                    best = Some((f, arg));
                }
            }
            match best {
                Some((_, v)) => Resolved::Value(v.clone()),
                None => absent("max/min need at least one argument"),
            }
        }
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (comparable_number(left), comparable_number(right)) {
        return match op {
            CmpOp::Eq => l == r,
            CmpOp::Ne => l != r,
            CmpOp::Lt => l < r,
            CmpOp::Le => l <= r,
            CmpOp::Gt => l > r,
            CmpOp::Ge => l >= r,
        };
    }
    let l = coerce_display(left);
    let r = coerce_display(right);
    match op {
        CmpOp::Eq => l == r,
        CmpOp::Ne => l != r,
        CmpOp::Lt => l < r,
        CmpOp::Le => l <= r,
        CmpOp::Gt => l > r,
        CmpOp::Ge => l >= r,
    }
}

fn comparable_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_owned(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn number_value(n: f64) -> Value {
    const EXACT_INT: f64 = 9_007_199_254_740_992.0; // 2^53
    if n.is_finite() && n.fract() == 0.0 && n.abs() < EXACT_INT {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/engine.rs"]
mod tests;
