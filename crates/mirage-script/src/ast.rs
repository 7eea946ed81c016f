//! Syntax tree for artifact modules.
//!
//! Function bodies are reference counted so closures created at runtime can
//! outlive the `Program` they were parsed from.

use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    /// Import declarations and re-exports in source order.
    pub fn module_requests(&self) -> Vec<&str> {
        self.body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Import(decl) => Some(decl.source.as_str()),
                Stmt::Export(ExportDecl::From { source, .. } | ExportDecl::All { source, .. }) => {
                    Some(source.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Import(ImportDecl),
    Export(ExportDecl),
    Var(VarDecl),
    Function(Arc<Function>),
    Return(Option<Expr>),
    Throw(Expr),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    Block(Vec<Stmt>),
    Expr(Expr),
    Empty,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    Default(String),
    Namespace(String),
    Named { imported: String, local: String },
}

#[derive(Debug, Clone)]
pub enum ExportDecl {
    Var(VarDecl),
    Function(Arc<Function>),
    Default(Expr),
    DefaultFunction(Arc<Function>),
    Named(Vec<ExportSpecifier>),
    From {
        source: String,
        specifiers: Vec<ExportSpecifier>,
    },
    All {
        source: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarations: Vec<(Pattern, Option<Expr>)>,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Ident(String),
    Object {
        props: Vec<PatternProp>,
        rest: Option<String>,
    },
    Array {
        items: Vec<Option<Pattern>>,
        rest: Option<String>,
    },
}

impl Pattern {
    /// Every name this pattern binds
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Pattern::Ident(name) => names.push(name),
            Pattern::Object { props, rest } => {
                for prop in props {
                    prop.value.collect_names(names);
                }
                if let Some(rest) = rest {
                    names.push(rest);
                }
            }
            Pattern::Array { items, rest } => {
                for item in items.iter().flatten() {
                    item.collect_names(names);
                }
                if let Some(rest) = rest {
                    names.push(rest);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternProp {
    pub key: String,
    pub value: Pattern,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub pattern: Pattern,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone)]
pub enum TemplateSegment {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone)]
pub enum ArrayElement {
    Item(Expr),
    Spread(Expr),
    Hole,
}

#[derive(Debug, Clone)]
pub enum Property {
    KeyValue(String, Expr),
    Computed(Expr, Expr),
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum Argument {
    Item(Expr),
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Template(Vec<TemplateSegment>),
    Ident(String),
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Argument>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Argument>,
    },
    Array(Vec<ArrayElement>),
    Object(Vec<Property>),
    Function(Arc<Function>),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Assign {
        target: String,
        op: Option<BinaryOp>,
        value: Box<Expr>,
    },
    Jsx(Box<JsxElement>),
}

#[derive(Debug, Clone)]
pub enum JsxName {
    Fragment,
    /// Lowercase intrinsic element such as `div`
    Host(String),
    /// Component reference: identifier or member chain
    Component(Expr),
}

#[derive(Debug, Clone)]
pub struct JsxElement {
    pub name: JsxName,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum JsxAttribute {
    /// `name`, `name="text"` or `name={expr}`; a bare name is `true`
    Named { name: String, value: Option<Expr> },
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum JsxChild {
    Text(String),
    Expr(Expr),
    Element(JsxElement),
}
