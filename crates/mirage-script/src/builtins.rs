//! Global objects and the methods of primitive values.
//!
//! Methods are materialized on property access as natives bound to their
//! receiver, so `items.map` can be passed around without losing `items`.

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde::Serialize;

use crate::error::{
    ScriptError, ScriptResult, array_length, check_array_length, check_string_length,
};
use crate::interpreter::Interpreter;
use crate::scope::Scope;
use crate::value::{ElementKind, Properties, Value, format_number};

/// Target for `console.*` output
pub const CONSOLE_TARGET: &str = "mirage::console";

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

fn object(entries: Vec<(&str, Value)>) -> Value {
    Value::object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

/// Declare the global bindings in `scope`
pub fn install(scope: &Scope) {
    scope.declare("NaN", Value::Number(f64::NAN), false);
    scope.declare("Infinity", Value::Number(f64::INFINITY), false);
    scope.declare("console", console(), false);
    scope.declare("Math", math(), false);
    scope.declare("JSON", json(), false);
    scope.declare("Object", object_constructor(), false);
    scope.declare("Array", array_constructor(), false);
    for name in ["Error", "TypeError", "RangeError"] {
        scope.declare(name, error_constructor(name), false);
    }
    scope.declare(
        "String",
        Value::native("String", |_, args| {
            Ok(Value::from(match args.first() {
                Some(value) => value.to_display_string(),
                None => String::new(),
            }))
        }),
        false,
    );
    scope.declare(
        "Number",
        Value::native("Number", |_, args| {
            Ok(Value::Number(args.first().map_or(0.0, Value::to_number)))
        }),
        false,
    );
    scope.declare(
        "Boolean",
        Value::native("Boolean", |_, args| Ok(Value::Bool(arg(args, 0).is_truthy()))),
        false,
    );
    scope.declare(
        "parseInt",
        Value::native("parseInt", |_, args| {
            let radix = match arg(args, 1) {
                Value::Undefined => 10,
                radix => radix.to_number() as u32,
            };
            Ok(Value::Number(parse_int(&arg(args, 0).to_display_string(), radix)))
        }),
        false,
    );
    scope.declare(
        "parseFloat",
        Value::native("parseFloat", |_, args| {
            Ok(Value::Number(parse_float(&arg(args, 0).to_display_string())))
        }),
        false,
    );
    scope.declare(
        "isNaN",
        Value::native("isNaN", |_, args| Ok(Value::Bool(arg(args, 0).to_number().is_nan()))),
        false,
    );
}

fn console() -> Value {
    fn line(args: &[Value]) -> String {
        args.iter()
            .map(|value| match value {
                Value::String(s) => s.to_string(),
                Value::Array(_) | Value::Object(_) => to_json(value)
                    .and_then(|json| serde_json::to_string(&json).ok())
                    .unwrap_or_else(|| value.to_display_string()),
                other => other.to_display_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    object(vec![
        (
            "log",
            Value::native("log", |_, args| {
                tracing::info!(target: CONSOLE_TARGET, "{}", line(args));
                Ok(Value::Undefined)
            }),
        ),
        (
            "info",
            Value::native("info", |_, args| {
                tracing::info!(target: CONSOLE_TARGET, "{}", line(args));
                Ok(Value::Undefined)
            }),
        ),
        (
            "debug",
            Value::native("debug", |_, args| {
                tracing::debug!(target: CONSOLE_TARGET, "{}", line(args));
                Ok(Value::Undefined)
            }),
        ),
        (
            "warn",
            Value::native("warn", |_, args| {
                tracing::warn!(target: CONSOLE_TARGET, "{}", line(args));
                Ok(Value::Undefined)
            }),
        ),
        (
            "error",
            Value::native("error", |_, args| {
                tracing::error!(target: CONSOLE_TARGET, "{}", line(args));
                Ok(Value::Undefined)
            }),
        ),
    ])
}

fn unary_math(name: &'static str, f: fn(f64) -> f64) -> (&'static str, Value) {
    (
        name,
        Value::native(name, move |_, args| Ok(Value::Number(f(arg(args, 0).to_number())))),
    )
}

/// Seed for `Math.random`; a fixed sequence keeps previews reproducible
static RANDOM_STATE: AtomicU64 = AtomicU64::new(0x2545_F491_4F6C_DD1D);

fn next_random() -> f64 {
    let mut x = RANDOM_STATE.load(AtomicOrdering::Relaxed);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    RANDOM_STATE.store(x, AtomicOrdering::Relaxed);
    (x >> 11) as f64 / (1u64 << 53) as f64
}

fn math() -> Value {
    object(vec![
        ("PI", Value::Number(std::f64::consts::PI)),
        ("E", Value::Number(std::f64::consts::E)),
        unary_math("abs", f64::abs),
        unary_math("floor", f64::floor),
        unary_math("ceil", f64::ceil),
        unary_math("round", |n| (n + 0.5).floor()),
        unary_math("trunc", f64::trunc),
        unary_math("sqrt", f64::sqrt),
        unary_math("sign", |n| if n == 0.0 || n.is_nan() { n } else { n.signum() }),
        (
            "pow",
            Value::native("pow", |_, args| {
                Ok(Value::Number(arg(args, 0).to_number().powf(arg(args, 1).to_number())))
            }),
        ),
        (
            "min",
            Value::native("min", |_, args| {
                Ok(Value::Number(args.iter().map(Value::to_number).fold(f64::INFINITY, |a, b| {
                    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
                })))
            }),
        ),
        (
            "max",
            Value::native("max", |_, args| {
                Ok(Value::Number(args.iter().map(Value::to_number).fold(
                    f64::NEG_INFINITY,
                    |a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) },
                )))
            }),
        ),
        ("random", Value::native("random", |_, _| Ok(Value::Number(next_random())))),
    ])
}

fn json() -> Value {
    object(vec![
        (
            "stringify",
            Value::native("stringify", |_, args| stringify(&arg(args, 0), &arg(args, 2))),
        ),
        (
            "parse",
            Value::native("parse", |_, args| {
                let text = arg(args, 0).to_display_string();
                serde_json::from_str::<serde_json::Value>(&text)
                    .map(|json| from_json(&json))
                    .map_err(|err| ScriptError::Thrown(format!("SyntaxError: {}", err)))
            }),
        ),
    ])
}

fn object_constructor() -> Value {
    object(vec![
        (
            "keys",
            Value::native("keys", |_, args| {
                Ok(Value::array(
                    own_entries(&arg(args, 0))
                        .into_iter()
                        .map(|(key, _)| Value::from(key))
                        .collect(),
                ))
            }),
        ),
        (
            "values",
            Value::native("values", |_, args| {
                Ok(Value::array(
                    own_entries(&arg(args, 0))
                        .into_iter()
                        .map(|(_, value)| value)
                        .collect(),
                ))
            }),
        ),
        (
            "entries",
            Value::native("entries", |_, args| {
                Ok(Value::array(
                    own_entries(&arg(args, 0))
                        .into_iter()
                        .map(|(key, value)| Value::array(vec![Value::from(key), value]))
                        .collect(),
                ))
            }),
        ),
        (
            "assign",
            Value::native("assign", |_, args| {
                let mut merged = Properties::new();
                for source in args {
                    merged.extend(own_entries(source));
                }
                Ok(Value::object(merged))
            }),
        ),
        (
            "fromEntries",
            Value::native("fromEntries", |_, args| {
                let mut properties = Properties::new();
                for entry in iterate(&arg(args, 0))? {
                    let pair = iterate(&entry)?;
                    properties.insert(arg(&pair, 0).to_display_string(), arg(&pair, 1));
                }
                Ok(Value::object(properties))
            }),
        ),
        ("freeze", Value::native("freeze", |_, args| Ok(arg(args, 0)))),
    ])
}

fn array_constructor() -> Value {
    object(vec![
        (
            "isArray",
            Value::native("isArray", |_, args| {
                Ok(Value::Bool(matches!(args.first(), Some(Value::Array(_)))))
            }),
        ),
        (
            "from",
            Value::native("from", |interp, args| {
                let source = arg(args, 0);
                let items = match &source {
                    Value::Object(properties) => {
                        let length = properties.get("length").map_or(0.0, Value::to_number);
                        vec![Value::Undefined; array_length(length)?]
                    }
                    other => iterate(other)?,
                };
                let mapper = arg(args, 1);
                if !mapper.is_callable() {
                    return Ok(Value::array(items));
                }
                let mut mapped = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    mapped.push(interp.call(&mapper, &[item, Value::Number(index as f64)])?);
                }
                Ok(Value::array(mapped))
            }),
        ),
        ("of", Value::native("of", |_, args| Ok(Value::array(args.to_vec())))),
    ])
}

fn error_constructor(name: &'static str) -> Value {
    Value::native(name, move |_, args| {
        let message = match arg(args, 0) {
            Value::Undefined => String::new(),
            other => other.to_display_string(),
        };
        Ok(object(vec![
            ("name", Value::from(name)),
            ("message", Value::from(message)),
        ]))
    })
}

// -------------------------------------------------------------------------
// Property access
// -------------------------------------------------------------------------

/// `value.key`
pub fn get_property(value: &Value, key: &str) -> ScriptResult<Value> {
    let found = match value {
        Value::Undefined | Value::Null => {
            return Err(ScriptError::type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                value.to_display_string(),
                key
            )));
        }
        Value::Object(properties) => properties.get(key).cloned(),
        Value::Namespace(namespace) => namespace.get(key),
        Value::Array(items) => match key {
            "length" => Some(Value::Number(items.len() as f64)),
            _ => match key.parse::<usize>() {
                Ok(index) => items.get(index).cloned(),
                Err(_) => array_method(items, key),
            },
        },
        Value::String(s) => match key {
            "length" => Some(Value::Number(s.encode_utf16().count() as f64)),
            _ => match key.parse::<usize>() {
                Ok(index) => s.chars().nth(index).map(|c| Value::from(c.to_string())),
                Err(_) => string_method(s, key),
            },
        },
        Value::Number(n) => number_method(*n, key),
        Value::Element(element) => match key {
            "props" => Some(Value::object(component_props(
                &element.props,
                &element.children,
            ))),
            "type" => match &element.kind {
                ElementKind::Host(tag) => Some(Value::from(tag.as_str())),
                ElementKind::Component(component) => Some(component.clone()),
                ElementKind::Fragment => None,
            },
            _ => None,
        },
        Value::Function(closure) if key == "name" => {
            Some(Value::from(closure.function.name.clone().unwrap_or_default()))
        }
        Value::Native(native) if key == "name" => Some(Value::from(native.name.as_str())),
        _ => None,
    };
    Ok(found.unwrap_or_default())
}

/// `value[key]`
pub fn get_index(value: &Value, key: &Value) -> ScriptResult<Value> {
    match (value, key) {
        (Value::Array(items), Value::Number(n)) => {
            if *n >= 0.0 && n.fract() == 0.0 {
                Ok(items.get(*n as usize).cloned().unwrap_or_default())
            } else {
                Ok(Value::Undefined)
            }
        }
        _ => get_property(value, &key.to_display_string()),
    }
}

/// Props object a component receives: attributes plus `children`
pub fn component_props(props: &Properties, children: &[Value]) -> Properties {
    let mut merged = props.clone();
    merged.shift_remove("key");
    match children {
        [] => {}
        [only] => {
            merged.insert("children".to_string(), only.clone());
        }
        many => {
            merged.insert("children".to_string(), Value::array(many.to_vec()));
        }
    }
    merged
}

/// Enumerable own entries, as used by spread and `Object.keys`
pub fn own_entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(properties) => properties
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        Value::Namespace(namespace) => namespace.entries(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item.clone()))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(index, c)| (index.to_string(), Value::from(c.to_string())))
            .collect(),
        _ => Vec::new(),
    }
}

/// Values produced by iterating `value` (spread, array destructuring)
pub fn iterate(value: &Value) -> ScriptResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items.to_vec()),
        Value::String(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
        other => Err(ScriptError::type_error(format!(
            "{} is not iterable",
            match other {
                Value::Undefined | Value::Null => other.to_display_string(),
                _ => other.type_of().to_string(),
            }
        ))),
    }
}

/// Resolve a relative `slice` bound against `len`
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    match value {
        Value::Undefined => default,
        other => {
            let n = other.to_number();
            if n.is_nan() {
                0
            } else if n < 0.0 {
                (len as f64 + n.trunc()).max(0.0) as usize
            } else {
                (n.trunc() as usize).min(len)
            }
        }
    }
}

fn insertion_sort(
    mut values: Vec<Value>,
    compare: &mut dyn FnMut(&Value, &Value) -> ScriptResult<Ordering>,
) -> ScriptResult<Vec<Value>> {
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 && compare(&values[j - 1], &values[j])? == Ordering::Greater {
            values.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(values)
}

fn array_method(items: &Arc<Vec<Value>>, name: &str) -> Option<Value> {
    let items = Arc::clone(items);
    let method = match name {
        "map" => Value::native("map", move |interp, args| {
            let callback = arg(args, 0);
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                out.push(interp.call(&callback, &[item.clone(), Value::Number(index as f64)])?);
            }
            Ok(Value::array(out))
        }),
        "filter" => Value::native("filter", move |interp, args| {
            let callback = arg(args, 0);
            let mut out = Vec::new();
            for (index, item) in items.iter().enumerate() {
                if interp
                    .call(&callback, &[item.clone(), Value::Number(index as f64)])?
                    .is_truthy()
                {
                    out.push(item.clone());
                }
            }
            Ok(Value::array(out))
        }),
        "forEach" => Value::native("forEach", move |interp, args| {
            let callback = arg(args, 0);
            for (index, item) in items.iter().enumerate() {
                interp.call(&callback, &[item.clone(), Value::Number(index as f64)])?;
            }
            Ok(Value::Undefined)
        }),
        "find" | "findIndex" | "some" | "every" => {
            let kind = name.to_string();
            Value::native(name, move |interp, args| {
                let callback = arg(args, 0);
                for (index, item) in items.iter().enumerate() {
                    let hit = interp
                        .call(&callback, &[item.clone(), Value::Number(index as f64)])?
                        .is_truthy();
                    match (kind.as_str(), hit) {
                        ("find", true) => return Ok(item.clone()),
                        ("findIndex", true) => return Ok(Value::Number(index as f64)),
                        ("some", true) => return Ok(Value::Bool(true)),
                        ("every", false) => return Ok(Value::Bool(false)),
                        _ => {}
                    }
                }
                Ok(match kind.as_str() {
                    "findIndex" => Value::Number(-1.0),
                    "some" => Value::Bool(false),
                    "every" => Value::Bool(true),
                    _ => Value::Undefined,
                })
            })
        }
        "reduce" => Value::native("reduce", move |interp, args| {
            let callback = arg(args, 0);
            let mut iter = items.iter().enumerate();
            let mut acc = match args.get(1) {
                Some(initial) => initial.clone(),
                None => match iter.next() {
                    Some((_, first)) => first.clone(),
                    None => {
                        return Err(ScriptError::type_error(
                            "Reduce of empty array with no initial value",
                        ));
                    }
                },
            };
            for (index, item) in iter {
                acc = interp.call(&callback, &[acc, item.clone(), Value::Number(index as f64)])?;
            }
            Ok(acc)
        }),
        "join" => Value::native("join", move |_, args| {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other => other.to_display_string(),
            };
            let mut out = String::new();
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    check_string_length(out.len() + separator.len())?;
                    out.push_str(&separator);
                }
                if !item.is_nullish() {
                    let part = item.to_display_string();
                    check_string_length(out.len() + part.len())?;
                    out.push_str(&part);
                }
            }
            Ok(Value::from(out))
        }),
        "includes" => Value::native("includes", move |_, args| {
            let needle = arg(args, 0);
            Ok(Value::Bool(items.iter().any(|item| {
                let both_nan = matches!(
                    (item, &needle),
                    (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan()
                );
                item.strict_equals(&needle) || both_nan
            })))
        }),
        "indexOf" => Value::native("indexOf", move |_, args| {
            let needle = arg(args, 0);
            Ok(Value::Number(
                items
                    .iter()
                    .position(|item| item.strict_equals(&needle))
                    .map_or(-1.0, |index| index as f64),
            ))
        }),
        "slice" => Value::native("slice", move |_, args| {
            let start = relative_index(&arg(args, 0), items.len(), 0);
            let end = relative_index(&arg(args, 1), items.len(), items.len());
            Ok(Value::array(if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            }))
        }),
        "concat" => Value::native("concat", move |_, args| {
            let mut out = items.to_vec();
            for value in args {
                match value {
                    Value::Array(more) => {
                        check_array_length(out.len().saturating_add(more.len()))?;
                        out.extend(more.iter().cloned());
                    }
                    other => out.push(other.clone()),
                }
            }
            Ok(Value::array(out))
        }),
        "reverse" => Value::native("reverse", move |_, _| {
            Ok(Value::array(items.iter().rev().cloned().collect()))
        }),
        "flat" => Value::native("flat", move |_, _| {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                match item {
                    Value::Array(inner) => out.extend(inner.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Ok(Value::array(out))
        }),
        "sort" => Value::native("sort", move |interp, args| {
            let comparator = arg(args, 0);
            let sorted = if comparator.is_callable() {
                insertion_sort(items.to_vec(), &mut |a, b| {
                    let result = interp.call(&comparator, &[a.clone(), b.clone()])?;
                    Ok(result.to_number().partial_cmp(&0.0).unwrap_or(Ordering::Equal))
                })?
            } else {
                insertion_sort(items.to_vec(), &mut |a, b| {
                    Ok(a.to_display_string().cmp(&b.to_display_string()))
                })?
            };
            Ok(Value::array(sorted))
        }),
        _ => return None,
    };
    Some(method)
}

fn string_method(s: &Arc<str>, name: &str) -> Option<Value> {
    let s = Arc::clone(s);
    let method = match name {
        "toUpperCase" => Value::native(name, move |_, _| Ok(Value::from(s.to_uppercase()))),
        "toLowerCase" => Value::native(name, move |_, _| Ok(Value::from(s.to_lowercase()))),
        "trim" => Value::native(name, move |_, _| Ok(Value::from(s.trim()))),
        "includes" => Value::native(name, move |_, args| {
            Ok(Value::Bool(s.contains(arg(args, 0).to_display_string().as_str())))
        }),
        "startsWith" => Value::native(name, move |_, args| {
            Ok(Value::Bool(s.starts_with(arg(args, 0).to_display_string().as_str())))
        }),
        "endsWith" => Value::native(name, move |_, args| {
            Ok(Value::Bool(s.ends_with(arg(args, 0).to_display_string().as_str())))
        }),
        "indexOf" => Value::native(name, move |_, args| {
            let needle = arg(args, 0).to_display_string();
            Ok(Value::Number(match s.find(needle.as_str()) {
                Some(byte) => s[..byte].chars().count() as f64,
                None => -1.0,
            }))
        }),
        "split" => Value::native(name, move |_, args| {
            let parts = match arg(args, 0) {
                Value::Undefined => vec![Value::from(&*s)],
                separator => {
                    let separator = separator.to_display_string();
                    if separator.is_empty() {
                        s.chars().map(|c| Value::from(c.to_string())).collect()
                    } else {
                        s.split(separator.as_str()).map(Value::from).collect()
                    }
                }
            };
            Ok(Value::array(parts))
        }),
        "slice" | "substring" => Value::native(name, move |_, args| {
            let chars: Vec<char> = s.chars().collect();
            let start = relative_index(&arg(args, 0), chars.len(), 0);
            let end = relative_index(&arg(args, 1), chars.len(), chars.len());
            Ok(Value::from(if start < end {
                chars[start..end].iter().collect::<String>()
            } else {
                String::new()
            }))
        }),
        "charAt" => Value::native(name, move |_, args| {
            let index = arg(args, 0).to_number().max(0.0) as usize;
            Ok(Value::from(
                s.chars().nth(index).map(String::from).unwrap_or_default(),
            ))
        }),
        "replace" => Value::native(name, move |_, args| {
            let pattern = arg(args, 0).to_display_string();
            let replacement = arg(args, 1).to_display_string();
            Ok(Value::from(s.replacen(pattern.as_str(), &replacement, 1)))
        }),
        "replaceAll" => Value::native(name, move |_, args| {
            let pattern = arg(args, 0).to_display_string();
            let replacement = arg(args, 1).to_display_string();
            Ok(Value::from(s.replace(pattern.as_str(), &replacement)))
        }),
        "repeat" => Value::native(name, move |_, args| {
            let count = arg(args, 0).to_number();
            if count < 0.0 || count.is_infinite() {
                return Err(ScriptError::Range(format!(
                    "Invalid count value: {}",
                    format_number(count)
                )));
            }
            let count = count as usize;
            check_string_length(s.len().saturating_mul(count))?;
            Ok(Value::from(s.repeat(count)))
        }),
        "padStart" | "padEnd" => {
            let at_start = name == "padStart";
            Value::native(name, move |_, args| {
                let width = arg(args, 0).to_number().max(0.0) as usize;
                let fill = match arg(args, 1) {
                    Value::Undefined => " ".to_string(),
                    other => other.to_display_string(),
                };
                let len = s.chars().count();
                if width <= len || fill.is_empty() {
                    return Ok(Value::String(Arc::clone(&s)));
                }
                // Every fill char takes at least one byte
                check_string_length(s.len().saturating_add(width - len))?;
                let padding: String = fill.chars().cycle().take(width - len).collect();
                Ok(Value::from(if at_start {
                    format!("{}{}", padding, s)
                } else {
                    format!("{}{}", s, padding)
                }))
            })
        }
        _ => return None,
    };
    Some(method)
}

fn number_method(n: f64, name: &str) -> Option<Value> {
    match name {
        "toFixed" => Some(Value::native(name, move |_, args| {
            let digits = arg(args, 0).to_number();
            let digits = if digits.is_nan() { 0 } else { digits as usize };
            if digits > 100 {
                return Err(ScriptError::Range(
                    "toFixed() digits argument must be between 0 and 100".to_string(),
                ));
            }
            Ok(Value::from(format!("{:.*}", digits, n)))
        })),
        "toString" => Some(Value::native(name, move |_, _| Ok(Value::from(format_number(n))))),
        "toLocaleString" => Some(Value::native(name, move |_, _| Ok(Value::from(group_thousands(n))))),
        _ => None,
    }
}

/// en-US grouping, e.g. `1234567.5` -> `1,234,567.5`
fn group_thousands(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    let text = format_number(rounded.abs());
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer.to_string(), Some(fraction.to_string())),
        None => (text, None),
    };
    let mut grouped = String::new();
    for (index, c) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(&fraction);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn parse_int(text: &str, radix: u32) -> f64 {
    let text = text.trim_start();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = if (radix == 16 || radix == 0)
        && (digits.starts_with("0x") || digits.starts_with("0X"))
    {
        (16, &digits[2..])
    } else if radix == 0 {
        (10, digits)
    } else {
        (radix, digits)
    };
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut value: Option<f64> = None;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        value = Some(value.unwrap_or(0.0) * radix as f64 + digit as f64);
    }
    match value {
        Some(v) if negative => -v,
        Some(v) => v,
        None => f64::NAN,
    }
}

fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    for (index, c) in text.char_indices() {
        let accept = match c {
            '0'..='9' => true,
            '+' | '-' => index == 0 || text[..index].ends_with(['e', 'E']),
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp && index > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !accept {
            break;
        }
        end = index + c.len_utf8();
    }
    let candidate = text[..end].trim_end_matches(['e', 'E', '+', '-']);
    if text.starts_with("Infinity") {
        return f64::INFINITY;
    }
    candidate.parse().unwrap_or(f64::NAN)
}

// -------------------------------------------------------------------------
// JSON
// -------------------------------------------------------------------------

/// Convert to JSON; `None` for values JSON omits (undefined, functions)
pub fn to_json(value: &Value) -> Option<serde_json::Value> {
    Some(match value {
        Value::Undefined | Value::Function(_) | Value::Native(_) => return None,
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                serde_json::Value::from(*n as i64)
            } else {
                serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_json(item).unwrap_or(serde_json::Value::Null))
                .collect(),
        ),
        Value::Object(_) | Value::Namespace(_) => serde_json::Value::Object(
            own_entries(value)
                .into_iter()
                .filter_map(|(key, item)| to_json(&item).map(|json| (key, json)))
                .collect(),
        ),
        Value::Element(_) => serde_json::Value::Object(serde_json::Map::new()),
    })
}

pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => Value::object(
            map.iter()
                .map(|(key, value)| (key.clone(), from_json(value)))
                .collect(),
        ),
    }
}

fn stringify(value: &Value, space: &Value) -> ScriptResult<Value> {
    let Some(json) = to_json(value) else {
        return Ok(Value::Undefined);
    };
    let indent = match space {
        Value::Number(n) => " ".repeat(n.clamp(0.0, 10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    };
    let text = if indent.is_empty() {
        serde_json::to_string(&json).map_err(|err| ScriptError::type_error(err.to_string()))?
    } else {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        json.serialize(&mut serializer)
            .map_err(|err| ScriptError::type_error(err.to_string()))?;
        String::from_utf8(buffer).map_err(|err| ScriptError::type_error(err.to_string()))?
    };
    Ok(Value::from(text))
}
