//! Tree-walking evaluator

use std::sync::Arc;

use crate::ast::*;
use crate::builtins;
use crate::error::{ScriptError, ScriptResult, check_array_length, check_string_length};
use crate::scope::Scope;
use crate::value::{Closure, ElementKind, Properties, Value};

/// Call depth at which evaluation fails with a `RangeError`
pub const DEFAULT_MAX_CALL_DEPTH: usize = 96;

/// Statement completion
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Arc<Scope>,
    depth: usize,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_CALL_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        let globals = Scope::root();
        builtins::install(&globals);
        Self {
            globals,
            depth: 0,
            max_depth,
        }
    }

    pub fn globals(&self) -> &Arc<Scope> {
        &self.globals
    }

    /// Current call depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn make_closure(&self, function: &Arc<Function>, scope: &Arc<Scope>) -> Value {
        Value::Function(Arc::new(Closure {
            function: Arc::clone(function),
            scope: Arc::clone(scope),
        }))
    }

    /// Claim one level of nesting; fails once the configured depth is reached.
    /// Every successful `enter` must be paired with [`Interpreter::leave`].
    pub fn enter(&mut self) -> ScriptResult<()> {
        if self.depth >= self.max_depth {
            return Err(ScriptError::stack_overflow());
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Call a function value
    pub fn call(&mut self, callee: &Value, args: &[Value]) -> ScriptResult<Value> {
        self.enter()?;
        let result = match callee {
            Value::Native(native) => {
                let func = Arc::clone(&native.func);
                func(self, args)
            }
            Value::Function(closure) => self.call_closure(closure, args),
            other => Err(ScriptError::type_error(format!(
                "{} is not a function",
                other.type_of()
            ))),
        };
        self.leave();
        result
    }

    fn call_closure(&mut self, closure: &Arc<Closure>, args: &[Value]) -> ScriptResult<Value> {
        let function = &closure.function;
        let scope = Scope::child(&closure.scope);
        if let Some(name) = &function.name {
            scope.declare(name, Value::Function(Arc::clone(closure)), false);
        }
        for (index, param) in function.params.iter().enumerate() {
            let mut value = args.get(index).cloned().unwrap_or_default();
            if matches!(value, Value::Undefined)
                && let Some(default) = &param.default
            {
                value = self.eval_expr(default, &scope)?;
            }
            self.bind_pattern(&param.pattern, value, &scope, true)?;
        }
        match &function.body {
            FunctionBody::Expr(expr) => self.eval_expr(expr, &scope),
            FunctionBody::Block(body) => match self.exec_statements(body, &scope)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal => Ok(Value::Undefined),
            },
        }
    }

    fn hoist(&self, body: &[Stmt], scope: &Arc<Scope>) {
        for stmt in body {
            if let Stmt::Function(function) = stmt
                && let Some(name) = &function.name
            {
                scope.declare(name, self.make_closure(function, scope), true);
            }
        }
    }

    fn exec_statements(&mut self, body: &[Stmt], scope: &Arc<Scope>) -> ScriptResult<Flow> {
        self.hoist(body, scope);
        for stmt in body {
            if let Flow::Return(value) = self.exec_stmt(stmt, scope)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt, scope: &Arc<Scope>) -> ScriptResult<Flow> {
        match stmt {
            Stmt::Var(decl) => {
                self.exec_var(decl, scope)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(argument) => {
                let value = match argument {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Throw(expr) => {
                let value = self.eval_expr(expr, scope)?;
                Err(ScriptError::Thrown(value.to_display_string()))
            }
            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test, scope)?.is_truthy() {
                    self.exec_stmt(consequent, scope)
                } else if let Some(alternate) = alternate {
                    self.exec_stmt(alternate, scope)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Block(body) => {
                let inner = Scope::child(scope);
                self.exec_statements(body, &inner)
            }
            Stmt::Expr(expr) => {
                self.eval_expr(expr, scope)?;
                Ok(Flow::Normal)
            }
            Stmt::Function(_) | Stmt::Import(_) | Stmt::Export(_) | Stmt::Empty => {
                Ok(Flow::Normal)
            }
        }
    }

    pub fn exec_var(&mut self, decl: &VarDecl, scope: &Arc<Scope>) -> ScriptResult<()> {
        let mutable = decl.kind != VarKind::Const;
        for (pattern, init) in &decl.declarations {
            let value = match init {
                Some(expr) => self.eval_expr(expr, scope)?,
                None => Value::Undefined,
            };
            self.bind_pattern(pattern, value, scope, mutable)?;
        }
        Ok(())
    }

    fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        value: Value,
        scope: &Arc<Scope>,
        mutable: bool,
    ) -> ScriptResult<()> {
        match pattern {
            Pattern::Ident(name) => {
                scope.declare(name, value, mutable);
                Ok(())
            }
            Pattern::Object { props, rest } => {
                if value.is_nullish() {
                    return Err(ScriptError::type_error(format!(
                        "Cannot destructure '{}' as it is {}.",
                        value.to_display_string(),
                        value.to_display_string()
                    )));
                }
                for prop in props {
                    let mut item = builtins::get_property(&value, &prop.key)?;
                    if matches!(item, Value::Undefined)
                        && let Some(default) = &prop.default
                    {
                        item = self.eval_expr(default, scope)?;
                    }
                    self.bind_pattern(&prop.value, item, scope, mutable)?;
                }
                if let Some(rest) = rest {
                    let mut remaining = Properties::new();
                    for (key, item) in builtins::own_entries(&value) {
                        if !props.iter().any(|prop| prop.key == key) {
                            remaining.insert(key, item);
                        }
                    }
                    scope.declare(rest, Value::object(remaining), mutable);
                }
                Ok(())
            }
            Pattern::Array { items, rest } => {
                let values = builtins::iterate(&value)?;
                for (index, item) in items.iter().enumerate() {
                    if let Some(item) = item {
                        let element = values.get(index).cloned().unwrap_or_default();
                        self.bind_pattern(item, element, scope, mutable)?;
                    }
                }
                if let Some(rest) = rest {
                    let remaining = values.iter().skip(items.len()).cloned().collect();
                    scope.declare(rest, Value::array(remaining), mutable);
                }
                Ok(())
            }
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr, scope: &Arc<Scope>) -> ScriptResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Str(s) => Value::string(s.as_str()),
                Literal::Num(n) => Value::Number(*n),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
                Literal::Undefined => Value::Undefined,
            }),
            Expr::Template(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        TemplateSegment::Text(text) => {
                            check_string_length(out.len() + text.len())?;
                            out.push_str(text)
                        }
                        TemplateSegment::Expr(expr) => {
                            let part = self.eval_expr(expr, scope)?.to_display_string();
                            check_string_length(out.len() + part.len())?;
                            out.push_str(&part)
                        }
                    }
                }
                Ok(Value::from(out))
            }
            Expr::Ident(name) => scope.lookup(name),
            Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => {
                Ok(self.eval_chain(expr, scope)?.unwrap_or_default())
            }
            Expr::New { callee, args } => {
                let constructor = self.eval_expr(callee, scope)?;
                let args = self.eval_arguments(args, scope)?;
                if !constructor.is_callable() {
                    return Err(ScriptError::type_error(format!(
                        "{} is not a constructor",
                        describe(callee)
                    )));
                }
                self.call(&constructor, &args)
            }
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        ArrayElement::Item(expr) => items.push(self.eval_expr(expr, scope)?),
                        ArrayElement::Spread(expr) => {
                            let value = self.eval_expr(expr, scope)?;
                            let spread = builtins::iterate(&value)?;
                            check_array_length(items.len() + spread.len())?;
                            items.extend(spread);
                        }
                        ArrayElement::Hole => items.push(Value::Undefined),
                    }
                }
                Ok(Value::array(items))
            }
            Expr::Object(properties) => {
                let mut map = Properties::new();
                for property in properties {
                    match property {
                        Property::KeyValue(key, expr) => {
                            let value = self.eval_expr(expr, scope)?;
                            map.insert(key.clone(), value);
                        }
                        Property::Computed(key, expr) => {
                            let key = self.eval_expr(key, scope)?.to_display_string();
                            let value = self.eval_expr(expr, scope)?;
                            map.insert(key, value);
                        }
                        Property::Spread(expr) => {
                            let value = self.eval_expr(expr, scope)?;
                            map.extend(builtins::own_entries(&value));
                        }
                    }
                }
                Ok(Value::object(map))
            }
            Expr::Function(function) => Ok(self.make_closure(function, scope)),
            Expr::Unary { op, arg } => {
                if let (UnaryOp::TypeOf, Expr::Ident(name)) = (op, arg.as_ref()) {
                    return Ok(match scope.lookup(name) {
                        Ok(value) => Value::from(value.type_of()),
                        Err(ScriptError::Reference(_)) => Value::from("undefined"),
                        Err(err) => return Err(err),
                    });
                }
                let value = self.eval_expr(arg, scope)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Value::Number(-value.to_number()),
                    UnaryOp::Plus => Value::Number(value.to_number()),
                    UnaryOp::TypeOf => Value::from(value.type_of()),
                })
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                binary(*op, &left, &right)
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval_expr(left, scope)?;
                let short_circuit = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval_expr(right, scope)
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test, scope)?.is_truthy() {
                    self.eval_expr(consequent, scope)
                } else {
                    self.eval_expr(alternate, scope)
                }
            }
            Expr::Assign { target, op, value } => {
                let mut value = self.eval_expr(value, scope)?;
                if let Some(op) = op {
                    value = binary(*op, &scope.lookup(target)?, &value)?;
                }
                scope.assign(target, value.clone())?;
                Ok(value)
            }
            Expr::Jsx(element) => self.eval_jsx(element, scope),
        }
    }

    /// Evaluate a member/call chain. `None` means an optional link
    /// short-circuited the whole chain.
    fn eval_chain(&mut self, expr: &Expr, scope: &Arc<Scope>) -> ScriptResult<Option<Value>> {
        match expr {
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let Some(object) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *optional && object.is_nullish() {
                    return Ok(None);
                }
                builtins::get_property(&object, property).map(Some)
            }
            Expr::Index {
                object,
                index,
                optional,
            } => {
                let Some(object) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *optional && object.is_nullish() {
                    return Ok(None);
                }
                let key = self.eval_expr(index, scope)?;
                builtins::get_index(&object, &key).map(Some)
            }
            Expr::Call {
                callee,
                args,
                optional,
            } => {
                let Some(function) = self.eval_chain(callee, scope)? else {
                    return Ok(None);
                };
                if *optional && function.is_nullish() {
                    return Ok(None);
                }
                let args = self.eval_arguments(args, scope)?;
                if !function.is_callable() {
                    return Err(ScriptError::type_error(format!(
                        "{} is not a function",
                        describe(callee)
                    )));
                }
                self.call(&function, &args).map(Some)
            }
            other => self.eval_expr(other, scope).map(Some),
        }
    }

    fn eval_arguments(
        &mut self,
        args: &[Argument],
        scope: &Arc<Scope>,
    ) -> ScriptResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Argument::Item(expr) => values.push(self.eval_expr(expr, scope)?),
                Argument::Spread(expr) => {
                    let value = self.eval_expr(expr, scope)?;
                    values.extend(builtins::iterate(&value)?);
                }
            }
        }
        Ok(values)
    }

    fn eval_jsx(&mut self, element: &JsxElement, scope: &Arc<Scope>) -> ScriptResult<Value> {
        let kind = match &element.name {
            JsxName::Fragment => ElementKind::Fragment,
            JsxName::Host(tag) => ElementKind::Host(tag.clone()),
            JsxName::Component(expr) => ElementKind::Component(self.eval_expr(expr, scope)?),
        };

        let mut props = Properties::new();
        for attribute in &element.attributes {
            match attribute {
                JsxAttribute::Named { name, value } => {
                    let value = match value {
                        Some(expr) => self.eval_expr(expr, scope)?,
                        None => Value::Bool(true),
                    };
                    props.insert(name.clone(), value);
                }
                JsxAttribute::Spread(expr) => {
                    let value = self.eval_expr(expr, scope)?;
                    props.extend(builtins::own_entries(&value));
                }
            }
        }

        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            children.push(match child {
                JsxChild::Text(text) => Value::string(text.as_str()),
                JsxChild::Expr(expr) => self.eval_expr(expr, scope)?,
                JsxChild::Element(element) => self.eval_jsx(element, scope)?,
            });
        }

        Ok(Value::element(kind, props, children))
    }
}

/// Readable name of a callee for error messages
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member {
            object, property, ..
        } => format!("{}.{}", describe(object), property),
        Expr::Index { object, .. } => format!("{}[...]", describe(object)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        _ => "expression".to_string(),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> ScriptResult<Value> {
    let value = match op {
        BinaryOp::Add => {
            if is_string_like(left) || is_string_like(right) {
                let mut out = left.to_display_string();
                let right = right.to_display_string();
                check_string_length(out.len() + right.len())?;
                out.push_str(&right);
                Value::from(out)
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Eq => Value::Bool(left.loose_equals(right)),
        BinaryOp::Ne => Value::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_equals(right)),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            let ordering = match (left, right) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => left.to_number().partial_cmp(&right.to_number()),
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(false));
            };
            Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Gt => ordering.is_gt(),
                BinaryOp::Le => ordering.is_le(),
                _ => ordering.is_ge(),
            })
        }
    };
    Ok(value)
}

fn is_string_like(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Element(_)
    )
}

/// Evaluate a standalone expression against the global scope
pub fn eval_source(interp: &mut Interpreter, source: &str) -> ScriptResult<Value> {
    let expr = crate::parser::parse_expression(source)?;
    let scope = Arc::clone(interp.globals());
    interp.eval_expr(&expr, &scope)
}
