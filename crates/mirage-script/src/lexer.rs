//! Tokenizer for artifact source.
//!
//! The lexer is position based and cheap to clone, which lets the parser
//! backtrack (arrow function detection) and drop to character level inside
//! JSX where ordinary tokenization does not apply.

use crate::error::{ScriptError, ScriptResult};

/// Punctuators recognised outside JSX text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Ellipsis,
    Colon,
    Question,
    QuestionDot,
    QuestionQuestion,
    Arrow,
    Assign,
    PlusAssign,
    MinusAssign,
    Eq,
    EqStrict,
    Ne,
    NeStrict,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
}

/// Piece of a template literal
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Cooked text
    Text(String),
    /// Source of a `${...}` substitution and where it starts
    Expr {
        source: String,
        line: u32,
        column: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Template(Vec<TemplatePart>),
    Punct(Punct),
    Eof,
}

/// Token with the position of its first character
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::starting_at(src, 1, 1)
    }

    /// Lexer whose reported positions are offset, used for template
    /// substitutions parsed out of a larger file.
    pub fn starting_at(src: &'a str, line: u32, column: u32) -> Self {
        Self {
            src,
            pos: 0,
            line,
            column,
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn eat_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::syntax(message, self.line, self.column)
    }

    /// Skip whitespace and comments
    pub fn skip_trivia(&mut self) -> ScriptResult<()> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error("Unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn next_token(&mut self) -> ScriptResult<Spanned> {
        self.skip_trivia()?;
        let line = self.line;
        let column = self.column;
        let token = match self.peek_char() {
            None => Token::Eof,
            Some(c) if is_ident_start(c) => Token::Ident(self.read_ident()),
            Some(c) if c.is_ascii_digit() => Token::Num(self.read_number()?),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                Token::Num(self.read_number()?)
            }
            Some(q @ ('"' | '\'')) => {
                self.bump();
                Token::Str(self.read_string_body(q)?)
            }
            Some('`') => {
                self.bump();
                Token::Template(self.read_template()?)
            }
            Some(_) => Token::Punct(self.read_punct()?),
        };
        Ok(Spanned {
            token,
            line,
            column,
        })
    }

    pub fn read_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if is_ident_part(c) {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    /// JSX tag and attribute names also allow `-`, `:` and `.`
    pub fn read_jsx_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if is_ident_part(c) || matches!(c, '-' | ':' | '.') {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn read_number(&mut self) -> ScriptResult<f64> {
        let start = self.pos;
        if self.peek_char() == Some('0') && matches!(self.peek_nth(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits_start = self.pos;
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            return i64::from_str_radix(&self.src[digits_start..self.pos], 16)
                .map(|n| n as f64)
                .map_err(|_| self.error("Invalid hexadecimal literal"));
        }
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek_char() == Some('.') && self.peek_nth(1).is_none_or(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump();
            }
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        self.src[start..self.pos]
            .parse::<f64>()
            .map_err(|_| self.error("Invalid numeric literal"))
    }

    /// Read a quoted string after its opening quote has been consumed.
    pub fn read_string_body(&mut self, quote: char) -> ScriptResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("Unterminated string literal")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.read_escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    /// Attribute strings in JSX have no escapes and may span lines.
    pub fn read_jsx_string(&mut self, quote: char) -> ScriptResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated JSX attribute string")),
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> ScriptResult<()> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("Unterminated escape sequence"))?;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\n' => {}
            'x' => {
                let code = self.read_hex_digits(2)?;
                out.push(char::from_u32(code).ok_or_else(|| self.error("Invalid escape"))?);
            }
            'u' => {
                let code = if self.eat_char('{') {
                    let start = self.pos;
                    while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.bump();
                    }
                    let digits = &self.src[start..self.pos];
                    if !self.eat_char('}') {
                        return Err(self.error("Invalid Unicode escape"));
                    }
                    u32::from_str_radix(digits, 16)
                        .map_err(|_| self.error("Invalid Unicode escape"))?
                } else {
                    let high = self.read_hex_digits(4)?;
                    if (0xD800..0xDC00).contains(&high)
                        && self.peek_char() == Some('\\')
                        && self.peek_nth(1) == Some('u')
                    {
                        self.bump();
                        self.bump();
                        let low = self.read_hex_digits(4)?;
                        0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF)
                    } else {
                        high
                    }
                };
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize) -> ScriptResult<u32> {
        let start = self.pos;
        for _ in 0..count {
            match self.peek_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.bump();
                }
                _ => return Err(self.error("Invalid hexadecimal escape")),
            }
        }
        u32::from_str_radix(&self.src[start..self.pos], 16)
            .map_err(|_| self.error("Invalid hexadecimal escape"))
    }

    fn read_template(&mut self) -> ScriptResult<Vec<TemplatePart>> {
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated template literal")),
                Some('`') => break,
                Some('\\') => self.read_escape(&mut text)?,
                Some('$') if self.peek_char() == Some('{') => {
                    self.bump();
                    if !text.is_empty() {
                        parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                    }
                    let line = self.line;
                    let column = self.column;
                    let source = self.read_balanced_braces()?;
                    parts.push(TemplatePart::Expr {
                        source,
                        line,
                        column,
                    });
                }
                Some(c) => text.push(c),
            }
        }
        if !text.is_empty() || parts.is_empty() {
            parts.push(TemplatePart::Text(text));
        }
        Ok(parts)
    }

    /// Consume up to the `}` matching an already consumed `{`, returning the
    /// text in between.
    fn read_balanced_braces(&mut self) -> ScriptResult<String> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek_char() {
                None => return Err(self.error("Unterminated template substitution")),
                Some('}') if depth == 0 => {
                    let source = self.src[start..self.pos].to_string();
                    self.bump();
                    return Ok(source);
                }
                Some('}') => {
                    depth -= 1;
                    self.bump();
                }
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some(q @ ('"' | '\'')) => {
                    self.bump();
                    self.read_string_body(q)?;
                }
                Some('`') => {
                    self.bump();
                    self.read_template()?;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn read_punct(&mut self) -> ScriptResult<Punct> {
        let rest = &self.src[self.pos..];
        const TABLE: &[(&str, Punct)] = &[
            ("...", Punct::Ellipsis),
            ("===", Punct::EqStrict),
            ("!==", Punct::NeStrict),
            ("=>", Punct::Arrow),
            ("==", Punct::Eq),
            ("!=", Punct::Ne),
            ("<=", Punct::Le),
            (">=", Punct::Ge),
            ("&&", Punct::AndAnd),
            ("||", Punct::OrOr),
            ("??", Punct::QuestionQuestion),
            ("+=", Punct::PlusAssign),
            ("-=", Punct::MinusAssign),
            ("{", Punct::LBrace),
            ("}", Punct::RBrace),
            ("(", Punct::LParen),
            (")", Punct::RParen),
            ("[", Punct::LBracket),
            ("]", Punct::RBracket),
            (";", Punct::Semi),
            (",", Punct::Comma),
            (".", Punct::Dot),
            (":", Punct::Colon),
            ("=", Punct::Assign),
            ("<", Punct::Lt),
            (">", Punct::Gt),
            ("+", Punct::Plus),
            ("-", Punct::Minus),
            ("*", Punct::Star),
            ("/", Punct::Slash),
            ("%", Punct::Percent),
            ("!", Punct::Bang),
        ];
        // `?.` is optional chaining only when not followed by a digit (`a?.5:b`).
        if rest.starts_with("?.") && !rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
            self.bump();
            self.bump();
            return Ok(Punct::QuestionDot);
        }
        if rest.starts_with('?') && !rest.starts_with("??") {
            self.bump();
            return Ok(Punct::Question);
        }
        for (text, punct) in TABLE {
            if rest.starts_with(text) {
                for _ in 0..text.len() {
                    self.bump();
                }
                return Ok(*punct);
            }
        }
        let c = self.peek_char().unwrap_or('\0');
        Err(self.error(format!("Unexpected character '{}'", c)))
    }

    /// Raw JSX text up to the next `{` or `<`
    pub fn read_jsx_text(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '{' || c == '<' {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let spanned = lexer.next_token().unwrap();
            if spanned.token == Token::Eof {
                break;
            }
            out.push(spanned.token);
        }
        out
    }

    #[test]
    fn test_import_line() {
        let toks = tokens(r#"import { Button as B } from "@mui/material";"#);
        assert_eq!(toks[0], Token::Ident("import".into()));
        assert_eq!(toks[1], Token::Punct(Punct::LBrace));
        assert_eq!(toks[6], Token::Str("@mui/material".into()));
        assert_eq!(toks[7], Token::Punct(Punct::Semi));
    }

    #[test]
    fn test_operators_longest_match() {
        let toks = tokens("a === b ?? c?.d => ...e");
        assert!(toks.contains(&Token::Punct(Punct::EqStrict)));
        assert!(toks.contains(&Token::Punct(Punct::QuestionQuestion)));
        assert!(toks.contains(&Token::Punct(Punct::QuestionDot)));
        assert!(toks.contains(&Token::Punct(Punct::Arrow)));
        assert!(toks.contains(&Token::Punct(Punct::Ellipsis)));
    }

    #[test]
    fn test_string_escapes() {
        let toks = tokens(r#"'it\'s' "\u{1F600}" "é""#);
        assert_eq!(toks[0], Token::Str("it's".into()));
        assert_eq!(toks[1], Token::Str("😀".into()));
        assert_eq!(toks[2], Token::Str("é".into()));
    }

    #[test]
    fn test_template_parts() {
        let toks = tokens("`p-4 ${active ? `x` : 'y'} end`");
        match &toks[0] {
            Token::Template(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], TemplatePart::Text("p-4 ".into()));
                assert!(
                    matches!(&parts[1], TemplatePart::Expr { source, .. } if source == "active ? `x` : 'y'")
                );
                assert_eq!(parts[2], TemplatePart::Text(" end".into()));
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_and_positions() {
        let mut lexer = Lexer::new("// header\n/* block */ value");
        let spanned = lexer.next_token().unwrap();
        assert_eq!(spanned.token, Token::Ident("value".into()));
        assert_eq!(spanned.line, 2);
        assert_eq!(spanned.column, 13);
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        assert!(matches!(
            lexer.next_token(),
            Err(ScriptError::Syntax { .. })
        ));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens("42 3.5 .5 1e3 0xff"), vec![
            Token::Num(42.0),
            Token::Num(3.5),
            Token::Num(0.5),
            Token::Num(1000.0),
            Token::Num(255.0),
        ]);
    }
}
