//! Runtime values
//!
//! Compound values are immutable and shared through `Arc`; artifact code
//! builds new objects instead of mutating existing ones.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::Function;
use crate::error::ScriptResult;
use crate::interpreter::Interpreter;
use crate::module::ModuleNamespace;
use crate::scope::Scope;

/// Host function signature
pub type NativeFn = Arc<dyn Fn(&mut Interpreter, &[Value]) -> ScriptResult<Value> + Send + Sync>;

/// Property map of a plain object
pub type Properties = IndexMap<String, Value>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<Properties>),
    Function(Arc<Closure>),
    Native(Arc<NativeFunction>),
    Element(Arc<Element>),
    Namespace(Arc<ModuleNamespace>),
}

/// Function value created by evaluating a function expression or declaration
pub struct Closure {
    pub function: Arc<Function>,
    pub scope: Arc<Scope>,
}

pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

/// Result of evaluating a JSX expression
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub props: Properties,
    pub children: Vec<Value>,
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Host(String),
    Component(Value),
    Fragment,
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    pub fn object(properties: Properties) -> Self {
        Value::Object(Arc::new(properties))
    }

    /// Wrap a Rust closure as a callable value
    pub fn native<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Interpreter, &[Value]) -> ScriptResult<Value> + Send + Sync + 'static,
    {
        Value::Native(Arc::new(NativeFunction {
            name: name.into(),
            func: Arc::new(func),
        }))
    }

    pub fn element(kind: ElementKind, props: Properties, children: Vec<Value>) -> Self {
        Value::Element(Arc::new(Element {
            kind,
            props,
            children,
        }))
    }

    /// `typeof` result
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Array(_) | Value::Object(_) | Value::Element(_) | Value::Namespace(_) => {
                "object"
            }
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(items) if items.is_empty() => 0.0,
            Value::Array(items) if items.len() == 1 => items[0].to_number(),
            _ => f64::NAN,
        }
    }

    /// String conversion as performed by `String(value)` and template literals
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(properties) => match (properties.get("name"), properties.get("message")) {
                (Some(Value::String(name)), Some(Value::String(message))) => {
                    if message.is_empty() {
                        name.to_string()
                    } else {
                        format!("{}: {}", name, message)
                    }
                }
                _ => "[object Object]".to_string(),
            },
            Value::Function(closure) => format!(
                "function {}() {{ [code] }}",
                closure.function.name.as_deref().unwrap_or_default()
            ),
            Value::Native(native) => format!("function {}() {{ [native code] }}", native.name),
            Value::Element(_) => "[object Object]".to_string(),
            Value::Namespace(_) => "[object Module]".to_string(),
        }
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Arc::ptr_eq(a, b),
            (Value::Element(a), Value::Element(b)) => Arc::ptr_eq(a, b),
            (Value::Namespace(a), Value::Namespace(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_) | Value::String(_) | Value::Bool(_), Value::Number(_) | Value::Bool(_))
            | (Value::Number(_) | Value::Bool(_), Value::String(_)) => {
                self.to_number() == other.to_number()
            }
            _ => self.strict_equals(other),
        }
    }

    /// Property lookup on plain objects and namespaces only
    pub fn own_property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(properties) => properties.get(key).cloned(),
            Value::Namespace(namespace) => namespace.get(key),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(properties) => f.debug_map().entries(properties.iter()).finish(),
            Value::Function(closure) => write!(
                f,
                "[Function {}]",
                closure.function.name.as_deref().unwrap_or("(anonymous)")
            ),
            Value::Native(native) => write!(f, "[Native {}]", native.name),
            Value::Element(element) => write!(f, "{:?}", element),
            Value::Namespace(namespace) => write!(f, "{:?}", namespace),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.function.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Number to string the way script code observes it
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::string("0").is_truthy());
        assert!(Value::array(Vec::new()).is_truthy());
    }

    #[test]
    fn test_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::string("1").loose_equals(&Value::Number(1.0)));
        assert!(!Value::string("1").strict_equals(&Value::Number(1.0)));
        let shared = Value::array(vec![Value::Number(1.0)]);
        assert!(shared.strict_equals(&shared.clone()));
        assert!(!shared.strict_equals(&Value::array(vec![Value::Number(1.0)])));
    }

    #[test]
    fn test_display_string() {
        let list = Value::array(vec![Value::Number(1.0), Value::Null, Value::string("a")]);
        assert_eq!(list.to_display_string(), "1,,a");
        let mut error = Properties::new();
        error.insert("name".into(), "Error".into());
        error.insert("message".into(), "boom".into());
        assert_eq!(Value::object(error).to_display_string(), "Error: boom");
    }
}
