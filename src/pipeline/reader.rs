//! Structured-literal reader.
//!
//! Reads the printed representation of Lisp data into a [`Value`] tree.
//! Highlight records are stored in this syntax by the notes tooling, so the
//! reader accepts the full range of spellings the printer may produce rather
//! than one fixed layout.
//!
//! Grammar (simplified):
//! ```text
//! datum   = list | vector | record | string | quote | atom
//! list    = "(" datum* ["." datum] ")"
//! vector  = "[" datum* "]"
//! record  = "#s(" datum* ")"
//! quote   = "'" datum
//! string  = '"' (char | "\" char)* '"'
//! atom    = integer | float | symbol
//! ```
//! Whitespace separates data; `;` starts a comment running to end of line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Reader errors. Positions are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("empty input")]
    Empty,

    #[error("unexpected end of input at position {0}")]
    UnexpectedEof(usize),

    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unclosed string starting at position {0}")]
    UnclosedString(usize),

    #[error("misplaced '.' at position {0}")]
    MisplacedDot(usize),

    #[error("integer out of range at position {0}")]
    IntegerOverflow(usize),

    #[error("trailing input at position {0}")]
    TrailingInput(usize),

    #[error("nesting deeper than {MAX_DEPTH} at position {0}")]
    TooDeep(usize),
}

/// Deepest nesting of lists, vectors, records and quotes the reader accepts.
pub const MAX_DEPTH: usize = 128;

/// A datum read from a structured literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Symbol(String),
    Str(String),
    List(Vec<Value>),
    /// A list whose final cdr is not a list: `(a b . c)`.
    Dotted(Vec<Value>, Box<Value>),
    Vector(Vec<Value>),
    /// `#s(type field...)`; element 0 is the type tag.
    Record(Vec<Value>),
}

impl Value {
    /// Numeric value of an integer or float atom.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// True for `()` and the symbol `nil`, which print identically.
    pub fn is_nil(&self) -> bool {
        match self {
            Value::List(items) => items.is_empty(),
            Value::Symbol(s) => s == "nil",
            _ => false,
        }
    }

    /// Elements of a proper list; `nil` counts as the empty list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Symbol(s) if s == "nil" => Some(&[]),
            _ => None,
        }
    }

    /// Short type name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dotted(..) => "dotted list",
            Value::Vector(_) => "vector",
            Value::Record(_) => "record",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            // Always print a fraction or exponent so the value reads back as a float.
            Value::Float(x) => {
                let s = format!("{x:?}");
                if s.contains(['.', 'e', 'E']) || !x.is_finite() {
                    write!(f, "{s}")
                } else {
                    write!(f, "{s}.0")
                }
            }
            Value::Symbol(s) => {
                if RE_INTEGER.is_match(s) || RE_FLOAT.is_match(s) {
                    write!(f, "\\")?;
                }
                for ch in s.chars() {
                    if is_delimiter(ch) || ch == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                Ok(())
            }
            Value::Str(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    if ch == '"' || ch == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                write!(f, "\"")
            }
            Value::List(items) => write_seq(f, "(", items, None, ")"),
            Value::Dotted(items, tail) => write_seq(f, "(", items, Some(tail), ")"),
            Value::Vector(items) => write_seq(f, "[", items, None, "]"),
            Value::Record(items) => write_seq(f, "#s(", items, None, ")"),
        }
    }
}

fn write_seq(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[Value],
    tail: Option<&Value>,
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    if let Some(tail) = tail {
        write!(f, " . {tail}")?;
    }
    write!(f, "{close}")
}

/// Read exactly one datum from `input`.
///
/// Leading and trailing whitespace and comments are ignored; anything else
/// after the datum is an error.
pub fn read(input: &str) -> Result<Value, ReadError> {
    let mut parser = Parser::new(input);
    parser.skip_atmosphere();
    if parser.at_end() {
        return Err(ReadError::Empty);
    }
    let value = parser.parse_datum()?;
    parser.skip_atmosphere();
    if !parser.at_end() {
        return Err(ReadError::TrailingInput(parser.pos));
    }
    Ok(value)
}

static RE_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+\.?$").unwrap());

static RE_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.[0-9]+|\.[0-9]+|[0-9]+(?:\.[0-9]*)?[eE][+-]?[0-9]+|\.[0-9]+[eE][+-]?[0-9]+)$")
        .unwrap()
});

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '[' | ']' | '"' | ';' | '\'')
}

/// Parser state
struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Skip whitespace and `;` comments.
    fn skip_atmosphere(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn parse_datum(&mut self) -> Result<Value, ReadError> {
        self.skip_atmosphere();
        if self.depth >= MAX_DEPTH {
            return Err(ReadError::TooDeep(self.pos));
        }
        self.depth += 1;
        let value = self.parse_form();
        self.depth -= 1;
        value
    }

    fn parse_form(&mut self) -> Result<Value, ReadError> {
        let start = self.pos;
        match self.peek() {
            None => Err(ReadError::UnexpectedEof(start)),
            Some('(') => {
                self.advance();
                self.parse_list()
            }
            Some('[') => {
                self.advance();
                self.parse_vector()
            }
            Some('"') => {
                self.advance();
                self.parse_string(start)
            }
            Some('\'') => {
                self.advance();
                let quoted = self.parse_datum()?;
                Ok(Value::List(vec![Value::Symbol("quote".into()), quoted]))
            }
            Some('#') => {
                if self.starts_with("#s(") {
                    self.pos += 3;
                    match self.parse_list()? {
                        Value::List(items) => Ok(Value::Record(items)),
                        _ => Err(ReadError::MisplacedDot(start)),
                    }
                } else {
                    Err(ReadError::UnexpectedChar('#', start))
                }
            }
            Some(ch @ (')' | ']')) => Err(ReadError::UnexpectedChar(ch, start)),
            Some(_) => self.parse_atom(),
        }
    }

    /// Parse list elements after the opening paren.
    fn parse_list(&mut self) -> Result<Value, ReadError> {
        let mut items = Vec::new();
        loop {
            self.skip_atmosphere();
            match self.peek() {
                None => return Err(ReadError::UnexpectedEof(self.pos)),
                Some(')') => {
                    self.advance();
                    return Ok(Value::List(items));
                }
                Some('.') if self.is_lone_dot() => {
                    let dot = self.pos;
                    self.advance();
                    if items.is_empty() {
                        return Err(ReadError::MisplacedDot(dot));
                    }
                    let tail = self.parse_datum()?;
                    self.skip_atmosphere();
                    match self.advance() {
                        Some(')') => {}
                        Some(_) => return Err(ReadError::MisplacedDot(dot)),
                        None => return Err(ReadError::UnexpectedEof(self.pos)),
                    }
                    // (a . (b c)) is the list (a b c)
                    return Ok(match tail {
                        Value::List(rest) => {
                            items.extend(rest);
                            Value::List(items)
                        }
                        Value::Symbol(ref s) if s == "nil" => Value::List(items),
                        Value::Dotted(rest, last) => {
                            items.extend(rest);
                            Value::Dotted(items, last)
                        }
                        other => Value::Dotted(items, Box::new(other)),
                    });
                }
                Some(_) => items.push(self.parse_datum()?),
            }
        }
    }

    fn parse_vector(&mut self) -> Result<Value, ReadError> {
        let mut items = Vec::new();
        loop {
            self.skip_atmosphere();
            match self.peek() {
                None => return Err(ReadError::UnexpectedEof(self.pos)),
                Some(']') => {
                    self.advance();
                    return Ok(Value::Vector(items));
                }
                Some(_) => items.push(self.parse_datum()?),
            }
        }
    }

    /// A `.` followed by a delimiter or end of input is the dotted-pair marker.
    fn is_lone_dot(&self) -> bool {
        let mut rest = self.input[self.pos..].chars();
        rest.next();
        rest.next().is_none_or(is_delimiter)
    }

    /// Parse string contents after the opening quote.
    fn parse_string(&mut self, start: usize) -> Result<Value, ReadError> {
        let mut result = String::new();
        loop {
            match self.advance() {
                None => return Err(ReadError::UnclosedString(start)),
                Some('"') => return Ok(Value::Str(result)),
                Some('\\') => match self.advance() {
                    None => return Err(ReadError::UnclosedString(start)),
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    // escaped newline is a line continuation
                    Some('\n') => {}
                    Some(ch) => result.push(ch),
                },
                Some(ch) => result.push(ch),
            }
        }
    }

    /// Parse a number or symbol token.
    fn parse_atom(&mut self) -> Result<Value, ReadError> {
        let start = self.pos;
        let mut token = String::new();
        let mut escaped = false;
        while let Some(ch) = self.peek() {
            if is_delimiter(ch) {
                break;
            }
            self.advance();
            if ch == '\\' {
                match self.advance() {
                    Some(next) => {
                        token.push(next);
                        escaped = true;
                    }
                    None => return Err(ReadError::UnexpectedEof(self.pos)),
                }
            } else {
                token.push(ch);
            }
        }

        if token.is_empty() {
            let ch = self.peek().unwrap_or('\0');
            return Err(ReadError::UnexpectedChar(ch, start));
        }
        if escaped {
            return Ok(Value::Symbol(token));
        }
        if RE_INTEGER.is_match(&token) {
            let digits = token.trim_end_matches('.').trim_start_matches('+');
            return digits
                .parse()
                .map(Value::Int)
                .map_err(|_| ReadError::IntegerOverflow(start));
        }
        if RE_FLOAT.is_match(&token) {
            if let Ok(x) = token.trim_start_matches('+').parse::<f64>() {
                return Ok(Value::Float(x));
            }
        }
        Ok(Value::Symbol(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Value {
        Value::Symbol(s.into())
    }

    #[test]
    fn reads_integers_and_floats() {
        assert_eq!(read("42").unwrap(), Value::Int(42));
        assert_eq!(read("-3").unwrap(), Value::Int(-3));
        assert_eq!(read("+4").unwrap(), Value::Int(4));
        assert_eq!(read("7.").unwrap(), Value::Int(7));
        assert_eq!(read("0.25").unwrap(), Value::Float(0.25));
        assert_eq!(read(".5").unwrap(), Value::Float(0.5));
        assert_eq!(read("1e3").unwrap(), Value::Float(1000.0));
        assert_eq!(read("-2.5e-1").unwrap(), Value::Float(-0.25));
    }

    #[test]
    fn non_numeric_tokens_are_symbols() {
        assert_eq!(read("tag").unwrap(), sym("tag"));
        assert_eq!(read("1+").unwrap(), sym("1+"));
        assert_eq!(read("-").unwrap(), sym("-"));
        assert_eq!(read("1.0e+INF").unwrap(), sym("1.0e+INF"));
        assert_eq!(read("org-noter--hl").unwrap(), sym("org-noter--hl"));
    }

    #[test]
    fn escaped_token_is_symbol() {
        assert_eq!(read(r"\12").unwrap(), sym("12"));
        assert_eq!(read(r"a\ b").unwrap(), sym("a b"));
    }

    #[test]
    fn reads_nested_lists() {
        let v = read("(tag 1 (2 (0.1 0.2 0.3 0.4)))").unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                sym("tag"),
                Value::Int(1),
                Value::List(vec![
                    Value::Int(2),
                    Value::List(vec![
                        Value::Float(0.1),
                        Value::Float(0.2),
                        Value::Float(0.3),
                        Value::Float(0.4),
                    ]),
                ]),
            ])
        );
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let at_limit = format!("{}{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(read(&at_limit).is_ok());

        let too_deep = format!("{}{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(read(&too_deep), Err(ReadError::TooDeep(MAX_DEPTH)));

        let huge = format!("(t 1 {}{})", "[".repeat(50_000), "]".repeat(50_000));
        assert!(matches!(read(&huge), Err(ReadError::TooDeep(_))));

        let quotes = format!("{}x", "'".repeat(50_000));
        assert!(matches!(read(&quotes), Err(ReadError::TooDeep(_))));
    }

    #[test]
    fn tolerates_whitespace_and_comments() {
        let v = read("  ; leading comment\n( a\n\t b ) ; trailing\n").unwrap();
        assert_eq!(v, Value::List(vec![sym("a"), sym("b")]));
    }

    #[test]
    fn dotted_pair_with_list_tail_splices() {
        let v = read("(2 . ((0.1 0.2 0.3 0.4)))").unwrap();
        let plain = read("(2 (0.1 0.2 0.3 0.4))").unwrap();
        assert_eq!(v, plain);
        assert_eq!(read("(a . nil)").unwrap(), Value::List(vec![sym("a")]));
    }

    #[test]
    fn dotted_pair_with_atom_tail() {
        let v = read("(a b . c)").unwrap();
        assert_eq!(v, Value::Dotted(vec![sym("a"), sym("b")], Box::new(sym("c"))));
        assert_eq!(v.to_string(), "(a b . c)");
    }

    #[test]
    fn dot_inside_token_is_not_a_pair() {
        assert_eq!(read("(a .b)").unwrap(), Value::List(vec![sym("a"), sym(".b")]));
    }

    #[test]
    fn misplaced_dots() {
        assert!(matches!(read("( . a)"), Err(ReadError::MisplacedDot(_))));
        assert!(matches!(read("(a . b c)"), Err(ReadError::MisplacedDot(_))));
    }

    #[test]
    fn reads_records_and_vectors() {
        let v = read("#s(hl 1 [2 3])").unwrap();
        assert_eq!(
            v,
            Value::Record(vec![
                sym("hl"),
                Value::Int(1),
                Value::Vector(vec![Value::Int(2), Value::Int(3)]),
            ])
        );
    }

    #[test]
    fn reads_strings_with_escapes() {
        assert_eq!(
            read(r#""say \"hi\"\n""#).unwrap(),
            Value::Str("say \"hi\"\n".into())
        );
        assert!(matches!(read("\"open"), Err(ReadError::UnclosedString(0))));
    }

    #[test]
    fn quote_expands() {
        assert_eq!(
            read("'x").unwrap(),
            Value::List(vec![sym("quote"), sym("x")])
        );
    }

    #[test]
    fn structural_errors() {
        assert_eq!(read(""), Err(ReadError::Empty));
        assert_eq!(read("  ; only a comment"), Err(ReadError::Empty));
        assert!(matches!(read("(a b"), Err(ReadError::UnexpectedEof(_))));
        assert!(matches!(read(")"), Err(ReadError::UnexpectedChar(')', 0))));
        assert!(matches!(read("(a))"), Err(ReadError::TrailingInput(3))));
        assert!(matches!(read("a b"), Err(ReadError::TrailingInput(2))));
        assert!(matches!(read("#<buffer x>"), Err(ReadError::UnexpectedChar('#', 0))));
        assert!(matches!(
            read("99999999999999999999"),
            Err(ReadError::IntegerOverflow(0))
        ));
    }

    #[test]
    fn display_reads_back() {
        let text = "#s(hl 1 (2 (0.5 1.0 -3 \"a b\")) [x] (p . q))";
        let v = read(text).unwrap();
        assert_eq!(read(&v.to_string()).unwrap(), v);
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(read(&sym("12").to_string()).unwrap(), sym("12"));
    }

    #[test]
    fn nil_is_empty_list() {
        assert!(sym("nil").is_nil());
        assert_eq!(sym("nil").as_list(), Some(&[][..]));
        assert!(read("()").unwrap().is_nil());
    }
}
