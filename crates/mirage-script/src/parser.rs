//! Recursive descent parser for artifact modules.
//!
//! Covers the ESM + JSX subset that generated components are written in.
//! JSX is parsed at character level by borrowing the lexer directly; the
//! parser never holds a lookahead token while doing so.

use std::sync::Arc;

use crate::ast::*;
use crate::error::{ScriptError, ScriptResult};
use crate::lexer::{Lexer, Punct, Spanned, TemplatePart, Token};

/// Expression nesting limit, keeps hostile input from exhausting the stack.
const MAX_NESTING: usize = 128;

/// Keywords this parser recognises but does not implement
const UNSUPPORTED: &[&str] = &[
    "for", "while", "do", "switch", "try", "class", "async", "await", "yield", "this", "delete",
];

/// Parse a module
pub fn parse(source: &str) -> ScriptResult<Program> {
    Parser::new(source).parse_program()
}

/// Parse a single expression (used for template substitutions and tests)
pub fn parse_expression(source: &str) -> ScriptResult<Expr> {
    let mut parser = Parser::new(source);
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

type Checkpoint<'a> = (Lexer<'a>, Option<Spanned>, usize);

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Spanned>,
    function_depth: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_lexer(Lexer::new(source))
    }

    fn with_lexer(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            peeked: None,
            function_depth: 0,
            nesting: 0,
        }
    }

    pub fn parse_program(mut self) -> ScriptResult<Program> {
        let mut body = Vec::new();
        while !self.at_eof()? {
            body.push(self.parse_statement(true)?);
        }
        Ok(Program { body })
    }

    // ---------------------------------------------------------------------
    // Token plumbing
    // ---------------------------------------------------------------------

    fn peek(&mut self) -> ScriptResult<&Spanned> {
        let spanned = match self.peeked.take() {
            Some(spanned) => spanned,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(spanned))
    }

    fn next(&mut self) -> ScriptResult<Spanned> {
        match self.peeked.take() {
            Some(spanned) => Ok(spanned),
            None => self.lexer.next_token(),
        }
    }

    fn checkpoint(&self) -> Checkpoint<'a> {
        (self.lexer.clone(), self.peeked.clone(), self.nesting)
    }

    fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        let (lexer, peeked, nesting) = checkpoint;
        self.lexer = lexer;
        self.peeked = peeked;
        self.nesting = nesting;
    }

    fn at_eof(&mut self) -> ScriptResult<bool> {
        Ok(self.peek()?.token == Token::Eof)
    }

    fn expect_eof(&mut self) -> ScriptResult<()> {
        if self.at_eof()? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn is_punct(&mut self, punct: Punct) -> ScriptResult<bool> {
        Ok(self.peek()?.token == Token::Punct(punct))
    }

    fn eat_punct(&mut self, punct: Punct) -> ScriptResult<bool> {
        if self.is_punct(punct)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> ScriptResult<()> {
        if self.eat_punct(punct)? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn is_keyword(&mut self, keyword: &str) -> ScriptResult<bool> {
        Ok(matches!(&self.peek()?.token, Token::Ident(name) if name == keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> ScriptResult<bool> {
        if self.is_keyword(keyword)? {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ScriptResult<()> {
        if self.eat_keyword(keyword)? {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> ScriptResult<String> {
        let spanned = self.next()?;
        match spanned.token {
            Token::Ident(name) => Ok(name),
            other => Err(unexpected_token(&other, spanned.line, spanned.column)),
        }
    }

    fn expect_string(&mut self) -> ScriptResult<String> {
        let spanned = self.next()?;
        match spanned.token {
            Token::Str(value) => Ok(value),
            other => Err(unexpected_token(&other, spanned.line, spanned.column)),
        }
    }

    /// Identifier or string, as allowed in import/export specifier lists
    fn expect_module_export_name(&mut self) -> ScriptResult<String> {
        let spanned = self.next()?;
        match spanned.token {
            Token::Ident(name) | Token::Str(name) => Ok(name),
            other => Err(unexpected_token(&other, spanned.line, spanned.column)),
        }
    }

    fn consume_semi(&mut self) -> ScriptResult<()> {
        self.eat_punct(Punct::Semi)?;
        Ok(())
    }

    fn unexpected(&mut self) -> ScriptError {
        match self.peek() {
            Ok(spanned) => unexpected_token(&spanned.token, spanned.line, spanned.column),
            Err(err) => err,
        }
    }

    fn enter(&mut self) -> ScriptResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ScriptError::syntax(
                "Expression nested too deeply",
                self.lexer.line(),
                self.lexer.column(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn parse_statement(&mut self, top_level: bool) -> ScriptResult<Stmt> {
        let spanned = self.peek()?.clone();
        let word = match &spanned.token {
            Token::Punct(Punct::Semi) => {
                self.next()?;
                return Ok(Stmt::Empty);
            }
            Token::Punct(Punct::LBrace) => {
                self.next()?;
                return Ok(Stmt::Block(self.parse_block_body()?));
            }
            Token::Ident(word) => word.as_str(),
            _ => return self.parse_expression_statement(),
        };

        match word {
            "import" | "export" if !top_level => Err(ScriptError::syntax(
                format!("'{}' may only appear at the top level of a module", word),
                spanned.line,
                spanned.column,
            )),
            "import" => self.parse_import(),
            "export" => self.parse_export(),
            "const" | "let" | "var" => {
                let decl = self.parse_var_decl()?;
                self.consume_semi()?;
                Ok(Stmt::Var(decl))
            }
            "function" => Ok(Stmt::Function(self.parse_function(true)?)),
            "return" => {
                self.next()?;
                if self.function_depth == 0 {
                    return Err(ScriptError::syntax(
                        "Illegal return statement",
                        spanned.line,
                        spanned.column,
                    ));
                }
                let next = self.peek()?;
                let ends = matches!(
                    next.token,
                    Token::Eof | Token::Punct(Punct::Semi) | Token::Punct(Punct::RBrace)
                ) || next.line > spanned.line;
                let argument = if ends {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semi()?;
                Ok(Stmt::Return(argument))
            }
            "throw" => {
                self.next()?;
                let argument = self.parse_expression()?;
                self.consume_semi()?;
                Ok(Stmt::Throw(argument))
            }
            "if" => {
                self.next()?;
                self.expect_punct(Punct::LParen)?;
                let test = self.parse_expression()?;
                self.expect_punct(Punct::RParen)?;
                let consequent = Box::new(self.parse_statement(false)?);
                let alternate = if self.eat_keyword("else")? {
                    Some(Box::new(self.parse_statement(false)?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    test,
                    consequent,
                    alternate,
                })
            }
            word if UNSUPPORTED.contains(&word) => Err(ScriptError::syntax(
                format!("Unsupported syntax: '{}'", word),
                spanned.line,
                spanned.column,
            )),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> ScriptResult<Stmt> {
        let expr = self.parse_expression()?;
        self.consume_semi()?;
        Ok(Stmt::Expr(expr))
    }

    /// Statements up to and including the closing `}`
    fn parse_block_body(&mut self) -> ScriptResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.eat_punct(Punct::RBrace)? {
            if self.at_eof()? {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement(false)?);
        }
        Ok(body)
    }

    fn parse_import(&mut self) -> ScriptResult<Stmt> {
        let keyword = self.next()?;
        let line = keyword.line;

        if let Token::Str(_) = self.peek()?.token {
            let source = self.expect_string()?;
            self.consume_semi()?;
            return Ok(Stmt::Import(ImportDecl {
                source,
                specifiers: Vec::new(),
                line,
            }));
        }

        // `import type { X } from "..."` carries no runtime bindings
        if self.is_keyword("type")? {
            let checkpoint = self.checkpoint();
            self.next()?;
            let type_only = match &self.peek()?.token {
                Token::Punct(Punct::LBrace) | Token::Punct(Punct::Star) => true,
                Token::Ident(name) => name != "from",
                _ => false,
            };
            if type_only {
                self.skip_import_clause()?;
                return Ok(Stmt::Empty);
            }
            self.restore(checkpoint);
        }

        let mut specifiers = Vec::new();
        let mut needs_more = true;
        if let Token::Ident(_) = self.peek()?.token {
            specifiers.push(ImportSpecifier::Default(self.expect_ident()?));
            needs_more = self.eat_punct(Punct::Comma)?;
        }
        if needs_more {
            if self.eat_punct(Punct::Star)? {
                self.expect_keyword("as")?;
                specifiers.push(ImportSpecifier::Namespace(self.expect_ident()?));
            } else if self.eat_punct(Punct::LBrace)? {
                while !self.eat_punct(Punct::RBrace)? {
                    let imported = self.expect_module_export_name()?;
                    let local = if self.eat_keyword("as")? {
                        self.expect_ident()?
                    } else {
                        imported.clone()
                    };
                    specifiers.push(ImportSpecifier::Named { imported, local });
                    if !self.eat_punct(Punct::Comma)? {
                        self.expect_punct(Punct::RBrace)?;
                        break;
                    }
                }
            } else {
                return Err(self.unexpected());
            }
        }
        self.expect_keyword("from")?;
        let source = self.expect_string()?;
        self.consume_semi()?;
        Ok(Stmt::Import(ImportDecl {
            source,
            specifiers,
            line,
        }))
    }

    fn skip_import_clause(&mut self) -> ScriptResult<()> {
        while !self.eat_keyword("from")? {
            if self.at_eof()? {
                return Err(self.unexpected());
            }
            self.next()?;
        }
        self.expect_string()?;
        self.consume_semi()
    }

    fn parse_export(&mut self) -> ScriptResult<Stmt> {
        self.next()?;

        if self.eat_keyword("default")? {
            if self.is_keyword("function")? {
                return Ok(Stmt::Export(ExportDecl::DefaultFunction(
                    self.parse_function(false)?,
                )));
            }
            let expr = self.parse_assignment()?;
            self.consume_semi()?;
            return Ok(Stmt::Export(ExportDecl::Default(expr)));
        }

        if self.is_keyword("const")? || self.is_keyword("let")? || self.is_keyword("var")? {
            let decl = self.parse_var_decl()?;
            self.consume_semi()?;
            return Ok(Stmt::Export(ExportDecl::Var(decl)));
        }

        if self.is_keyword("function")? {
            return Ok(Stmt::Export(ExportDecl::Function(self.parse_function(true)?)));
        }

        if self.eat_punct(Punct::Star)? {
            self.expect_keyword("from")?;
            let source = self.expect_string()?;
            self.consume_semi()?;
            return Ok(Stmt::Export(ExportDecl::All { source }));
        }

        if self.eat_punct(Punct::LBrace)? {
            let mut specifiers = Vec::new();
            while !self.eat_punct(Punct::RBrace)? {
                let local = self.expect_module_export_name()?;
                let exported = if self.eat_keyword("as")? {
                    self.expect_module_export_name()?
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier { local, exported });
                if !self.eat_punct(Punct::Comma)? {
                    self.expect_punct(Punct::RBrace)?;
                    break;
                }
            }
            let decl = if self.eat_keyword("from")? {
                ExportDecl::From {
                    source: self.expect_string()?,
                    specifiers,
                }
            } else {
                ExportDecl::Named(specifiers)
            };
            self.consume_semi()?;
            return Ok(Stmt::Export(decl));
        }

        Err(self.unexpected())
    }

    fn parse_var_decl(&mut self) -> ScriptResult<VarDecl> {
        let keyword = self.next()?;
        let kind = match &keyword.token {
            Token::Ident(word) if word == "const" => VarKind::Const,
            Token::Ident(word) if word == "let" => VarKind::Let,
            _ => VarKind::Var,
        };
        let mut declarations = Vec::new();
        loop {
            let pattern = self.parse_binding_pattern()?;
            let init = if self.eat_punct(Punct::Assign)? {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if kind == VarKind::Const && init.is_none() {
                return Err(ScriptError::syntax(
                    "Missing initializer in const declaration",
                    keyword.line,
                    keyword.column,
                ));
            }
            declarations.push((pattern, init));
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }
        Ok(VarDecl { kind, declarations })
    }

    fn parse_binding_pattern(&mut self) -> ScriptResult<Pattern> {
        if self.eat_punct(Punct::LBrace)? {
            let mut props = Vec::new();
            let mut rest = None;
            while !self.eat_punct(Punct::RBrace)? {
                if self.eat_punct(Punct::Ellipsis)? {
                    rest = Some(self.expect_ident()?);
                } else {
                    let key = self.expect_module_export_name()?;
                    let value = if self.eat_punct(Punct::Colon)? {
                        self.parse_binding_pattern()?
                    } else {
                        Pattern::Ident(key.clone())
                    };
                    let default = if self.eat_punct(Punct::Assign)? {
                        Some(self.parse_assignment()?)
                    } else {
                        None
                    };
                    props.push(PatternProp {
                        key,
                        value,
                        default,
                    });
                }
                if !self.eat_punct(Punct::Comma)? {
                    self.expect_punct(Punct::RBrace)?;
                    break;
                }
            }
            return Ok(Pattern::Object { props, rest });
        }

        if self.eat_punct(Punct::LBracket)? {
            let mut items = Vec::new();
            let mut rest = None;
            while !self.eat_punct(Punct::RBracket)? {
                if self.eat_punct(Punct::Comma)? {
                    items.push(None);
                    continue;
                }
                if self.eat_punct(Punct::Ellipsis)? {
                    rest = Some(self.expect_ident()?);
                } else {
                    items.push(Some(self.parse_binding_pattern()?));
                }
                if !self.eat_punct(Punct::Comma)? {
                    self.expect_punct(Punct::RBracket)?;
                    break;
                }
            }
            return Ok(Pattern::Array { items, rest });
        }

        Ok(Pattern::Ident(self.expect_ident()?))
    }

    /// `function name(params) { body }` starting at the `function` keyword
    fn parse_function(&mut self, require_name: bool) -> ScriptResult<Arc<Function>> {
        let keyword = self.next()?;
        let name = match &self.peek()?.token {
            Token::Ident(_) => Some(self.expect_ident()?),
            _ => None,
        };
        if require_name && name.is_none() {
            return Err(ScriptError::syntax(
                "Function statements require a function name",
                keyword.line,
                keyword.column,
            ));
        }
        let params = self.parse_params()?;
        self.expect_punct(Punct::LBrace)?;
        let body = self.parse_function_block()?;
        Ok(Arc::new(Function {
            name,
            params,
            body: FunctionBody::Block(body),
        }))
    }

    fn parse_params(&mut self) -> ScriptResult<Vec<Param>> {
        self.expect_punct(Punct::LParen)?;
        let mut params = Vec::new();
        while !self.eat_punct(Punct::RParen)? {
            let pattern = self.parse_binding_pattern()?;
            let default = if self.eat_punct(Punct::Assign)? {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param { pattern, default });
            if !self.eat_punct(Punct::Comma)? {
                self.expect_punct(Punct::RParen)?;
                break;
            }
        }
        Ok(params)
    }

    fn parse_function_block(&mut self) -> ScriptResult<Vec<Stmt>> {
        self.function_depth += 1;
        let body = self.parse_block_body();
        self.function_depth -= 1;
        body
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    pub fn parse_expression(&mut self) -> ScriptResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ScriptResult<Expr> {
        self.enter()?;
        let result = self.parse_assignment_inner();
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self) -> ScriptResult<Expr> {
        if let Some(function) = self.try_arrow()? {
            return Ok(Expr::Function(function));
        }

        let expr = self.parse_conditional()?;
        let op = match self.peek()?.token {
            Token::Punct(Punct::Assign) => None,
            Token::Punct(Punct::PlusAssign) => Some(BinaryOp::Add),
            Token::Punct(Punct::MinusAssign) => Some(BinaryOp::Sub),
            _ => return Ok(expr),
        };
        let operator = self.next()?;
        let Expr::Ident(target) = expr else {
            return Err(ScriptError::syntax(
                "Invalid assignment target",
                operator.line,
                operator.column,
            ));
        };
        let value = Box::new(self.parse_assignment()?);
        Ok(Expr::Assign { target, op, value })
    }

    fn try_arrow(&mut self) -> ScriptResult<Option<Arc<Function>>> {
        let params = match &self.peek()?.token {
            Token::Ident(name) if !is_reserved(name) => {
                let checkpoint = self.checkpoint();
                let name = self.expect_ident()?;
                if !self.is_punct(Punct::Arrow)? {
                    self.restore(checkpoint);
                    return Ok(None);
                }
                vec![Param {
                    pattern: Pattern::Ident(name),
                    default: None,
                }]
            }
            Token::Punct(Punct::LParen) => {
                let checkpoint = self.checkpoint();
                match self.parse_params() {
                    Ok(params) if self.is_punct(Punct::Arrow)? => params,
                    _ => {
                        self.restore(checkpoint);
                        return Ok(None);
                    }
                }
            }
            _ => return Ok(None),
        };

        self.expect_punct(Punct::Arrow)?;
        let body = if self.eat_punct(Punct::LBrace)? {
            FunctionBody::Block(self.parse_function_block()?)
        } else {
            FunctionBody::Expr(self.parse_assignment()?)
        };
        Ok(Some(Arc::new(Function {
            name: None,
            params,
            body,
        })))
    }

    fn parse_conditional(&mut self) -> ScriptResult<Expr> {
        let test = self.parse_binary(1)?;
        if !self.eat_punct(Punct::Question)? {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect_punct(Punct::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ScriptResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let Some((precedence, op)) = binary_operator(&self.peek()?.token) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.next()?;
            self.enter()?;
            let right = self.parse_binary(precedence + 1);
            self.leave();
            let right = Box::new(right?);
            let left_box = Box::new(left);
            left = match op {
                Operator::Binary(op) => Expr::Binary {
                    op,
                    left: left_box,
                    right,
                },
                Operator::Logical(op) => Expr::Logical {
                    op,
                    left: left_box,
                    right,
                },
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ScriptResult<Expr> {
        let op = match &self.peek()?.token {
            Token::Punct(Punct::Bang) => UnaryOp::Not,
            Token::Punct(Punct::Minus) => UnaryOp::Neg,
            Token::Punct(Punct::Plus) => UnaryOp::Plus,
            Token::Ident(word) if word == "typeof" => UnaryOp::TypeOf,
            _ => return self.parse_postfix(),
        };
        self.next()?;
        self.enter()?;
        let arg = self.parse_unary();
        self.leave();
        Ok(Expr::Unary {
            op,
            arg: Box::new(arg?),
        })
    }

    fn parse_postfix(&mut self) -> ScriptResult<Expr> {
        let mut expr = if self.is_keyword("new")? {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            if self.eat_punct(Punct::Dot)? {
                let property = self.expect_ident()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                };
            } else if self.eat_punct(Punct::QuestionDot)? {
                if self.is_punct(Punct::LParen)? {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        optional: true,
                    };
                } else if self.eat_punct(Punct::LBracket)? {
                    let index = self.parse_expression()?;
                    self.expect_punct(Punct::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional: true,
                    };
                } else {
                    let property = self.expect_ident()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        optional: true,
                    };
                }
            } else if self.eat_punct(Punct::LBracket)? {
                let index = self.parse_expression()?;
                self.expect_punct(Punct::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    optional: false,
                };
            } else if self.is_punct(Punct::LParen)? {
                let args = self.parse_arguments()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    optional: false,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_new(&mut self) -> ScriptResult<Expr> {
        self.next()?;
        let mut callee = self.parse_primary()?;
        while self.eat_punct(Punct::Dot)? {
            let property = self.expect_ident()?;
            callee = Expr::Member {
                object: Box::new(callee),
                property,
                optional: false,
            };
        }
        let args = if self.is_punct(Punct::LParen)? {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::New {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_arguments(&mut self) -> ScriptResult<Vec<Argument>> {
        self.expect_punct(Punct::LParen)?;
        let mut args = Vec::new();
        while !self.eat_punct(Punct::RParen)? {
            if self.eat_punct(Punct::Ellipsis)? {
                args.push(Argument::Spread(self.parse_assignment()?));
            } else {
                args.push(Argument::Item(self.parse_assignment()?));
            }
            if !self.eat_punct(Punct::Comma)? {
                self.expect_punct(Punct::RParen)?;
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> ScriptResult<Expr> {
        let spanned = self.next()?;
        match spanned.token {
            Token::Num(n) => Ok(Expr::Literal(Literal::Num(n))),
            Token::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
            Token::Template(parts) => self.parse_template(parts),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Literal::Bool(true))),
                "false" => Ok(Expr::Literal(Literal::Bool(false))),
                "null" => Ok(Expr::Literal(Literal::Null)),
                "undefined" => Ok(Expr::Literal(Literal::Undefined)),
                "function" => {
                    let name = match &self.peek()?.token {
                        Token::Ident(_) => Some(self.expect_ident()?),
                        _ => None,
                    };
                    let params = self.parse_params()?;
                    self.expect_punct(Punct::LBrace)?;
                    let body = self.parse_function_block()?;
                    Ok(Expr::Function(Arc::new(Function {
                        name,
                        params,
                        body: FunctionBody::Block(body),
                    })))
                }
                word if UNSUPPORTED.contains(&word) || word == "import" || word == "export" => {
                    Err(ScriptError::syntax(
                        format!("Unsupported syntax: '{}'", word),
                        spanned.line,
                        spanned.column,
                    ))
                }
                _ => Ok(Expr::Ident(name)),
            },
            Token::Punct(Punct::LParen) => {
                let expr = self.parse_expression()?;
                self.expect_punct(Punct::RParen)?;
                Ok(expr)
            }
            Token::Punct(Punct::LBracket) => self.parse_array_literal(),
            Token::Punct(Punct::LBrace) => self.parse_object_literal(),
            Token::Punct(Punct::Lt) => {
                self.enter()?;
                let element = self.parse_jsx_after_lt(spanned.line);
                self.leave();
                Ok(Expr::Jsx(Box::new(element?)))
            }
            other => Err(unexpected_token(&other, spanned.line, spanned.column)),
        }
    }

    fn parse_template(&mut self, parts: Vec<TemplatePart>) -> ScriptResult<Expr> {
        let mut segments = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                TemplatePart::Text(text) => segments.push(TemplateSegment::Text(text)),
                TemplatePart::Expr {
                    source,
                    line,
                    column,
                } => {
                    let mut inner = Parser::with_lexer(Lexer::starting_at(&source, line, column));
                    inner.nesting = self.nesting;
                    let expr = inner.parse_expression()?;
                    inner.expect_eof()?;
                    segments.push(TemplateSegment::Expr(expr));
                }
            }
        }
        Ok(Expr::Template(segments))
    }

    fn parse_array_literal(&mut self) -> ScriptResult<Expr> {
        let mut elements = Vec::new();
        while !self.eat_punct(Punct::RBracket)? {
            if self.eat_punct(Punct::Comma)? {
                elements.push(ArrayElement::Hole);
                continue;
            }
            if self.eat_punct(Punct::Ellipsis)? {
                elements.push(ArrayElement::Spread(self.parse_assignment()?));
            } else {
                elements.push(ArrayElement::Item(self.parse_assignment()?));
            }
            if !self.eat_punct(Punct::Comma)? {
                self.expect_punct(Punct::RBracket)?;
                break;
            }
        }
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> ScriptResult<Expr> {
        let mut properties = Vec::new();
        while !self.eat_punct(Punct::RBrace)? {
            if self.eat_punct(Punct::Ellipsis)? {
                properties.push(Property::Spread(self.parse_assignment()?));
            } else if self.eat_punct(Punct::LBracket)? {
                let key = self.parse_assignment()?;
                self.expect_punct(Punct::RBracket)?;
                self.expect_punct(Punct::Colon)?;
                properties.push(Property::Computed(key, self.parse_assignment()?));
            } else {
                let spanned = self.next()?;
                let (key, shorthand_ok) = match spanned.token {
                    Token::Ident(name) => (name, true),
                    Token::Str(value) => (value, false),
                    Token::Num(n) => (crate::value::format_number(n), false),
                    other => return Err(unexpected_token(&other, spanned.line, spanned.column)),
                };
                if self.eat_punct(Punct::Colon)? {
                    properties.push(Property::KeyValue(key, self.parse_assignment()?));
                } else if self.is_punct(Punct::LParen)? {
                    let params = self.parse_params()?;
                    self.expect_punct(Punct::LBrace)?;
                    let body = self.parse_function_block()?;
                    let function = Arc::new(Function {
                        name: None,
                        params,
                        body: FunctionBody::Block(body),
                    });
                    properties.push(Property::KeyValue(key, Expr::Function(function)));
                } else if shorthand_ok {
                    properties.push(Property::KeyValue(key.clone(), Expr::Ident(key)));
                } else {
                    return Err(self.unexpected());
                }
            }
            if !self.eat_punct(Punct::Comma)? {
                self.expect_punct(Punct::RBrace)?;
                break;
            }
        }
        Ok(Expr::Object(properties))
    }

    // ---------------------------------------------------------------------
    // JSX
    // ---------------------------------------------------------------------

    fn jsx_error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::syntax(message, self.lexer.line(), self.lexer.column())
    }

    fn jsx_skip(&mut self) -> ScriptResult<()> {
        debug_assert!(self.peeked.is_none());
        self.lexer.skip_trivia()
    }

    fn jsx_expect_char(&mut self, expected: char) -> ScriptResult<()> {
        if self.lexer.eat_char(expected) {
            Ok(())
        } else {
            Err(self.jsx_error(format!("Expected '{}' in JSX", expected)))
        }
    }

    fn jsx_eat_ellipsis(&mut self) -> bool {
        let checkpoint = self.lexer.clone();
        if self.lexer.eat_char('.') && self.lexer.eat_char('.') && self.lexer.eat_char('.') {
            true
        } else {
            self.lexer = checkpoint;
            false
        }
    }

    /// `{ expr }` after the opening brace, in token mode until the closing brace.
    /// Returns `None` for empty containers such as `{/* note */}`.
    fn parse_jsx_expression_container(&mut self) -> ScriptResult<Option<Expr>> {
        self.jsx_skip()?;
        if self.lexer.eat_char('}') {
            return Ok(None);
        }
        let expr = self.parse_assignment()?;
        self.expect_punct(Punct::RBrace)?;
        Ok(Some(expr))
    }

    fn parse_jsx_after_lt(&mut self, line: u32) -> ScriptResult<JsxElement> {
        self.jsx_skip()?;
        if self.lexer.eat_char('>') {
            let (children, closing) = self.parse_jsx_children()?;
            if !closing.is_empty() {
                return Err(self.jsx_error(format!(
                    "Expected corresponding closing tag for JSX fragment, found </{}>",
                    closing
                )));
            }
            return Ok(JsxElement {
                name: JsxName::Fragment,
                attributes: Vec::new(),
                children,
                line,
            });
        }

        let tag = self.lexer.read_jsx_name();
        if tag.is_empty() {
            return Err(self.jsx_error("Expected JSX tag name"));
        }
        let name = jsx_name(&tag);

        let mut attributes = Vec::new();
        loop {
            self.jsx_skip()?;
            match self.lexer.peek_char() {
                Some('/') => {
                    self.lexer.bump();
                    self.jsx_skip()?;
                    self.jsx_expect_char('>')?;
                    return Ok(JsxElement {
                        name,
                        attributes,
                        children: Vec::new(),
                        line,
                    });
                }
                Some('>') => {
                    self.lexer.bump();
                    break;
                }
                Some('{') => {
                    self.lexer.bump();
                    self.jsx_skip()?;
                    if !self.jsx_eat_ellipsis() {
                        return Err(self.jsx_error("Expected '...' in JSX spread attribute"));
                    }
                    let expr = self.parse_assignment()?;
                    self.expect_punct(Punct::RBrace)?;
                    attributes.push(JsxAttribute::Spread(expr));
                }
                Some(_) => {
                    let attr = self.lexer.read_jsx_name();
                    if attr.is_empty() {
                        return Err(self.jsx_error(format!("Unexpected character in <{}>", tag)));
                    }
                    self.jsx_skip()?;
                    let value = if self.lexer.eat_char('=') {
                        self.jsx_skip()?;
                        match self.lexer.peek_char() {
                            Some(q @ ('"' | '\'')) => {
                                self.lexer.bump();
                                let text = self.lexer.read_jsx_string(q)?;
                                Some(Expr::Literal(Literal::Str(decode_entities(&text))))
                            }
                            Some('{') => {
                                self.lexer.bump();
                                match self.parse_jsx_expression_container()? {
                                    Some(expr) => Some(expr),
                                    None => {
                                        return Err(self.jsx_error(
                                            "JSX attributes must only be assigned a non-empty expression",
                                        ));
                                    }
                                }
                            }
                            _ => return Err(self.jsx_error("Expected JSX attribute value")),
                        }
                    } else {
                        None
                    };
                    attributes.push(JsxAttribute::Named { name: attr, value });
                }
                None => return Err(self.jsx_error(format!("Unterminated JSX tag <{}>", tag))),
            }
        }

        let (children, closing) = self.parse_jsx_children()?;
        if closing != tag {
            return Err(self.jsx_error(format!(
                "Expected corresponding JSX closing tag for <{}>, found </{}>",
                tag, closing
            )));
        }
        Ok(JsxElement {
            name,
            attributes,
            children,
            line,
        })
    }

    /// Children up to the closing tag; returns them with the closing tag name.
    fn parse_jsx_children(&mut self) -> ScriptResult<(Vec<JsxChild>, String)> {
        let mut children = Vec::new();
        loop {
            let raw = self.lexer.read_jsx_text();
            if let Some(text) = normalize_jsx_text(&raw) {
                children.push(JsxChild::Text(text));
            }
            match self.lexer.peek_char() {
                Some('{') => {
                    self.lexer.bump();
                    if let Some(expr) = self.parse_jsx_expression_container()? {
                        children.push(JsxChild::Expr(expr));
                    }
                }
                Some('<') => {
                    let line = self.lexer.line();
                    self.lexer.bump();
                    self.jsx_skip()?;
                    if self.lexer.eat_char('/') {
                        self.jsx_skip()?;
                        let closing = self.lexer.read_jsx_name();
                        self.jsx_skip()?;
                        self.jsx_expect_char('>')?;
                        return Ok((children, closing));
                    }
                    self.enter()?;
                    let element = self.parse_jsx_after_lt(line);
                    self.leave();
                    children.push(JsxChild::Element(element?));
                }
                _ => return Err(self.jsx_error("Unterminated JSX contents")),
            }
        }
    }
}

enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn binary_operator(token: &Token) -> Option<(u8, Operator)> {
    let Token::Punct(punct) = token else {
        return None;
    };
    let entry = match punct {
        Punct::OrOr => (1, Operator::Logical(LogicalOp::Or)),
        Punct::QuestionQuestion => (1, Operator::Logical(LogicalOp::Nullish)),
        Punct::AndAnd => (2, Operator::Logical(LogicalOp::And)),
        Punct::Eq => (3, Operator::Binary(BinaryOp::Eq)),
        Punct::Ne => (3, Operator::Binary(BinaryOp::Ne)),
        Punct::EqStrict => (3, Operator::Binary(BinaryOp::StrictEq)),
        Punct::NeStrict => (3, Operator::Binary(BinaryOp::StrictNe)),
        Punct::Lt => (4, Operator::Binary(BinaryOp::Lt)),
        Punct::Gt => (4, Operator::Binary(BinaryOp::Gt)),
        Punct::Le => (4, Operator::Binary(BinaryOp::Le)),
        Punct::Ge => (4, Operator::Binary(BinaryOp::Ge)),
        Punct::Plus => (5, Operator::Binary(BinaryOp::Add)),
        Punct::Minus => (5, Operator::Binary(BinaryOp::Sub)),
        Punct::Star => (6, Operator::Binary(BinaryOp::Mul)),
        Punct::Slash => (6, Operator::Binary(BinaryOp::Div)),
        Punct::Percent => (6, Operator::Binary(BinaryOp::Rem)),
        _ => return None,
    };
    Some(entry)
}

fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "true" | "false" | "null" | "undefined" | "function" | "new" | "typeof" | "import"
            | "export"
    ) || UNSUPPORTED.contains(&name)
}

fn unexpected_token(token: &Token, line: u32, column: u32) -> ScriptError {
    let description = match token {
        Token::Eof => "end of input".to_string(),
        Token::Ident(name) => format!("'{}'", name),
        Token::Str(value) => format!("string \"{}\"", value),
        Token::Num(n) => format!("number {}", n),
        Token::Template(_) => "template literal".to_string(),
        Token::Punct(punct) => format!("{:?}", punct),
    };
    ScriptError::syntax(format!("Unexpected {}", description), line, column)
}

fn jsx_name(tag: &str) -> JsxName {
    if tag.contains('.') {
        let mut parts = tag.split('.');
        let head = parts.next().unwrap_or_default();
        let mut expr = Expr::Ident(head.to_string());
        for part in parts {
            expr = Expr::Member {
                object: Box::new(expr),
                property: part.to_string(),
                optional: false,
            };
        }
        return JsxName::Component(expr);
    }
    match tag.chars().next() {
        Some(c) if c.is_uppercase() || c == '_' || c == '$' => {
            JsxName::Component(Expr::Ident(tag.to_string()))
        }
        _ => JsxName::Host(tag.to_string()),
    }
}

/// JSX whitespace rules: lines are trimmed where they meet a line break,
/// blank lines vanish and the remaining lines join with single spaces.
fn normalize_jsx_text(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        let line = line.trim_end_matches('\r');
        let mut trimmed = line;
        if index != 0 {
            trimmed = trimmed.trim_start();
        }
        if index != last {
            trimmed = trimmed.trim_end();
        }
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    if out.is_empty() {
        None
    } else {
        Some(decode_entities(&out))
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    const ENTITIES: &[(&str, &str)] = &[
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&#39;", "'"),
        ("&nbsp;", "\u{a0}"),
        ("&copy;", "©"),
        ("&middot;", "·"),
        ("&rarr;", "→"),
        ("&larr;", "←"),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(index) = rest.find('&') {
        out.push_str(&rest[..index]);
        rest = &rest[index..];
        for (entity, replacement) in ENTITIES {
            if rest.starts_with(entity) {
                out.push_str(replacement);
                rest = &rest[entity.len()..];
                continue 'outer;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_imports() {
        let program = parse(
            r#"
            import React, { useState as useLocal } from "react";
            import * as Icons from '@mui/icons-material';
            import "./styles.css";
            import type { Props } from "./types";
            "#,
        )
        .unwrap();
        assert_eq!(program.module_requests(), vec![
            "react",
            "@mui/icons-material",
            "./styles.css"
        ]);
        let Stmt::Import(decl) = &program.body[0] else {
            panic!("expected import");
        };
        assert_eq!(decl.specifiers, vec![
            ImportSpecifier::Default("React".into()),
            ImportSpecifier::Named {
                imported: "useState".into(),
                local: "useLocal".into()
            },
        ]);
    }

    #[test]
    fn test_parse_exports() {
        let program = parse(
            r#"
            export const a = 1, b = 2;
            export function helper() { return a; }
            export { a as alpha, b };
            export { Button } from "@mui/material";
            export * from "./more";
            export default function App() { return <div />; }
            "#,
        )
        .unwrap();
        assert_eq!(program.body.len(), 6);
        assert!(matches!(
            &program.body[5],
            Stmt::Export(ExportDecl::DefaultFunction(f)) if f.name.as_deref() == Some("App")
        ));
        assert_eq!(program.module_requests(), vec!["@mui/material", "./more"]);
    }

    #[test]
    fn test_parse_arrow_functions() {
        let expr = parse_expression("({ title, items = [] }) => items.map(item => item + title)")
            .unwrap();
        let Expr::Function(function) = expr else {
            panic!("expected arrow");
        };
        assert_eq!(function.params.len(), 1);
        assert!(matches!(function.body, FunctionBody::Expr(Expr::Call { .. })));
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        let expr = parse_expression("(a + b) * 2").unwrap();
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_precedence() {
        let expr = parse_expression("a || b && c === 1 + 2 * 3").unwrap();
        let Expr::Logical {
            op: LogicalOp::Or,
            right,
            ..
        } = expr
        else {
            panic!("expected ||");
        };
        assert!(matches!(
            *right,
            Expr::Logical {
                op: LogicalOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_jsx_tree() {
        let expr = parse_expression(
            r#"<Card className="p-4" {...rest} disabled>
                  Hello {name}!
                  <Card.Title>Title &amp; more</Card.Title>
                  {/* ignored */}
                  <>
                    <br/>
                  </>
               </Card>"#,
        )
        .unwrap();
        let Expr::Jsx(element) = expr else {
            panic!("expected jsx");
        };
        assert!(matches!(element.name, JsxName::Component(Expr::Ident(ref n)) if n == "Card"));
        assert_eq!(element.attributes.len(), 3);
        assert!(matches!(
            &element.attributes[2],
            JsxAttribute::Named { name, value: None } if name == "disabled"
        ));
        assert_eq!(element.children.len(), 5);
        assert!(matches!(&element.children[0], JsxChild::Text(t) if t == "Hello "));
        assert!(matches!(&element.children[1], JsxChild::Expr(Expr::Ident(n)) if n == "name"));
        assert!(matches!(&element.children[2], JsxChild::Text(t) if t == "!"));
        let JsxChild::Element(title) = &element.children[3] else {
            panic!("expected nested element");
        };
        assert!(matches!(title.name, JsxName::Component(Expr::Member { .. })));
        assert!(matches!(&title.children[0], JsxChild::Text(t) if t == "Title & more"));
        assert!(matches!(&element.children[4], JsxChild::Element(f) if matches!(f.name, JsxName::Fragment)));
    }

    #[test]
    fn test_jsx_comparison_is_not_tag() {
        let expr = parse_expression("count < 3 ? <b>few</b> : null").unwrap();
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = parse_expression("<div><span></div>").unwrap_err();
        assert!(err.to_string().contains("closing tag"));
    }

    #[test]
    fn test_template_substitution() {
        let expr = parse_expression("`btn ${variant === 'primary' ? 'bg-blue' : ''}`").unwrap();
        let Expr::Template(segments) = expr else {
            panic!("expected template");
        };
        assert_eq!(segments.len(), 2);
        assert!(matches!(segments[1], TemplateSegment::Expr(Expr::Conditional { .. })));
    }

    #[test]
    fn test_return_outside_function() {
        let err = parse("return 1;").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { .. }));
    }

    #[test]
    fn test_unsupported_syntax_is_reported() {
        let err = parse("for (const x of xs) {}").unwrap_err();
        assert!(err.to_string().contains("Unsupported syntax: 'for'"));
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let err = parse_expression(&source).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));
    }

    #[test]
    fn test_return_on_next_line() {
        let program = parse("function f() { return\n 1 }").unwrap();
        let Stmt::Function(f) = &program.body[0] else {
            panic!("expected function");
        };
        let FunctionBody::Block(body) = &f.body else {
            panic!("expected block body");
        };
        assert!(matches!(body[0], Stmt::Return(None)));
    }
}
