//! Literal grammar for model output.
//!
//! Accepts only inert data: quoted strings (with implicit concatenation),
//! decimal integers and floats, `True`/`False`/`None`, lists, tuples and
//! dicts. Any other name, operator or call is a syntax error, so untrusted
//! text can never do more than describe a value.

use thiserror::Error;

/// Containers nested deeper than this are rejected.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    /// Integer outside the `i64` range, kept as its decimal digits.
    BigInt(String),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Entries in source order; duplicate keys are kept.
    Dict(Vec<(Literal, Literal)>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("name '{name}' at offset {offset} is not a literal")]
    UnknownName { name: String, offset: usize },

    #[error("unexpected trailing input at offset {0}")]
    TrailingInput(usize),

    #[error("literal nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Int(_) | Literal::BigInt(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "boolean",
            Literal::None => "None",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Dict(_) => "dict",
        }
    }

    /// Display text for scalar values; `None` for containers.
    ///
    /// `None` renders as an empty string, booleans as `True`/`False` and
    /// integral floats keep their trailing `.0`.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Literal::Str(s) => Some(s.clone()),
            Literal::Int(i) => Some(i.to_string()),
            Literal::BigInt(digits) => Some(digits.clone()),
            Literal::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{f:.1}")),
            Literal::Float(f) => Some(f.to_string()),
            Literal::Bool(true) => Some("True".to_string()),
            Literal::Bool(false) => Some("False".to_string()),
            Literal::None => Some(String::new()),
            Literal::List(_) | Literal::Tuple(_) | Literal::Dict(_) => None,
        }
    }
}

/// Parses `text` as exactly one literal. Surrounding whitespace and `#`
/// comments are allowed, anything else after the literal is an error.
pub fn parse(text: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(text);
    let value = parser.value()?;
    parser.skip_trivia();
    if parser.pos < text.len() {
        return Err(LiteralError::TrailingInput(parser.pos));
    }
    Ok(value)
}

/// Parses one literal from the start of `text` and returns it with the
/// byte offset just past it. Whatever follows is left unread.
pub fn parse_prefix(text: &str) -> Result<(Literal, usize), LiteralError> {
    let mut parser = Parser::new(text);
    let value = parser.value()?;
    Ok((value, parser.pos))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('\\') if self.rest()[1..].starts_with('\n') => {
                    self.pos += 2;
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_trivia();
        if self.string_start().is_some() {
            return self.strings();
        }
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('[') => {
                self.enter()?;
                self.bump();
                let items = self.items(']')?;
                self.leave();
                Ok(Literal::List(items))
            }
            Some('(') => {
                self.enter()?;
                let value = self.parenthesized()?;
                self.leave();
                Ok(value)
            }
            Some('{') => {
                self.enter()?;
                let value = self.dict()?;
                self.leave();
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.name(),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Comma-separated values up to `close`, which is consumed. A trailing
    /// comma is allowed.
    fn items(&mut self, close: char) -> Result<Vec<Literal>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// `()` and `(x,)` are tuples; `(x)` is just `x`.
    fn parenthesized(&mut self) -> Result<Literal, LiteralError> {
        self.bump();
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Literal::Tuple(Vec::new()));
        }
        let first = self.value()?;
        self.skip_trivia();
        match self.peek() {
            Some(')') => {
                self.bump();
                Ok(first)
            }
            Some(',') => {
                self.bump();
                let mut items = vec![first];
                items.extend(self.items(')')?);
                Ok(Literal::Tuple(items))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn dict(&mut self) -> Result<Literal, LiteralError> {
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.skip_trivia();
            if self.peek() != Some(':') {
                return Err(self.unexpected());
            }
            self.bump();
            let value = self.value()?;
            entries.push((key, value));
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(Literal::Dict(entries));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn name(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            other => Err(LiteralError::UnknownName {
                name: other.to_string(),
                offset: start,
            }),
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.bump();
            self.skip_trivia();
            if sign == '-' {
                text.push('-');
            }
        }

        let mut is_float = false;
        let mut digits = 0;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    digits += 1;
                    text.push(c);
                }
                '_' => {}
                '.' if !is_float => {
                    is_float = true;
                    text.push(c);
                }
                'e' | 'E' if digits > 0 => {
                    is_float = true;
                    text.push(c);
                    self.bump();
                    if let Some(sign @ ('-' | '+')) = self.peek() {
                        text.push(sign);
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let invalid = || LiteralError::InvalidNumber {
            text: self.src[start..self.pos].to_string(),
            offset: start,
        };
        if digits == 0 {
            return Err(invalid());
        }
        if is_float {
            text.parse::<f64>().map(Literal::Float).map_err(|_| invalid())
        } else {
            Ok(text
                .parse::<i64>()
                .map_or_else(|_| Literal::BigInt(text), Literal::Int))
        }
    }

    /// If a string literal starts here, returns whether it is raw and the
    /// length of its prefix.
    fn string_start(&self) -> Option<(bool, usize)> {
        const PREFIXES: [(&str, bool); 5] =
            [("r", true), ("R", true), ("u", false), ("U", false), ("", false)];
        let rest = self.rest();
        PREFIXES.iter().find_map(|(prefix, raw)| {
            rest.strip_prefix(*prefix)
                .filter(|after| after.starts_with(|c: char| c == '\'' || c == '"'))
                .map(|_| (*raw, prefix.len()))
        })
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Literal, LiteralError> {
        let mut out = String::new();
        while let Some((raw, prefix_len)) = self.string_start() {
            self.pos += prefix_len;
            self.string(raw, &mut out)?;
            self.skip_trivia();
        }
        Ok(Literal::Str(out))
    }

    fn string(&mut self, raw: bool, out: &mut String) -> Result<(), LiteralError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(LiteralError::UnexpectedEnd);
        };
        let triple: String = [quote, quote, quote].iter().collect();
        let delimiter = if self.rest().starts_with(&triple[1..]) {
            self.pos += 2;
            triple
        } else {
            quote.to_string()
        };
        let is_triple = delimiter.len() == 3;

        loop {
            if self.rest().starts_with(delimiter.as_str()) {
                self.pos += delimiter.len();
                return Ok(());
            }
            let c = self
                .bump()
                .ok_or(LiteralError::UnterminatedString(start))?;
            match c {
                '\n' if !is_triple => return Err(LiteralError::UnterminatedString(start)),
                '\\' if raw => {
                    out.push('\\');
                    let next = self
                        .bump()
                        .ok_or(LiteralError::UnterminatedString(start))?;
                    out.push(next);
                }
                '\\' => self.escape(start, out)?,
                _ => out.push(c),
            }
        }
    }

    fn escape(&mut self, string_start: usize, out: &mut String) -> Result<(), LiteralError> {
        let offset = self.pos - 1;
        let c = self
            .bump()
            .ok_or(LiteralError::UnterminatedString(string_start))?;
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape(offset))?);
            }
            'x' => out.push(self.hex_escape(2, offset)?),
            'u' => out.push(self.hex_escape(4, offset)?),
            'U' => out.push(self.hex_escape(8, offset)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, len: usize, offset: usize) -> Result<char, LiteralError> {
        let digits = self
            .rest()
            .get(..len)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or(LiteralError::InvalidEscape(offset))?;
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| LiteralError::InvalidEscape(offset))?;
        self.pos += len;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Literal {
        Literal::Str(text.to_string())
    }

    #[test]
    fn test_parses_scalars() {
        assert_eq!(parse("'hi'").unwrap(), s("hi"));
        assert_eq!(parse("\"hi\"").unwrap(), s("hi"));
        assert_eq!(parse("42").unwrap(), Literal::Int(42));
        assert_eq!(parse("-7").unwrap(), Literal::Int(-7));
        assert_eq!(parse("1_000").unwrap(), Literal::Int(1000));
        assert_eq!(parse("5.5").unwrap(), Literal::Float(5.5));
        assert_eq!(parse("1e3").unwrap(), Literal::Float(1000.0));
        assert_eq!(parse("True").unwrap(), Literal::Bool(true));
        assert_eq!(parse("False").unwrap(), Literal::Bool(false));
        assert_eq!(parse("None").unwrap(), Literal::None);
    }

    #[test]
    fn test_parses_nested_containers() {
        let value = parse("{'a': [1, (2, 3), {'b': None}], 'c': ()}").unwrap();
        assert_eq!(
            value,
            Literal::Dict(vec![
                (
                    s("a"),
                    Literal::List(vec![
                        Literal::Int(1),
                        Literal::Tuple(vec![Literal::Int(2), Literal::Int(3)]),
                        Literal::Dict(vec![(s("b"), Literal::None)]),
                    ])
                ),
                (s("c"), Literal::Tuple(vec![])),
            ])
        );
    }

    #[test]
    fn test_parenthesised_value_is_not_a_tuple() {
        assert_eq!(parse("('x')").unwrap(), s("x"));
        assert_eq!(parse("('x',)").unwrap(), Literal::Tuple(vec![s("x")]));
    }

    #[test]
    fn test_trailing_commas_and_comments_are_allowed() {
        let value = parse("[\n  'a',  # first\n  'b',\n]").unwrap();
        assert_eq!(value, Literal::List(vec![s("a"), s("b")]));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(parse(r"'it\'s'").unwrap(), s("it's"));
        assert_eq!(parse(r"'a\nb\tc'").unwrap(), s("a\nb\tc"));
        assert_eq!(parse(r"'\x41\u00e9\101'").unwrap(), s("AéA"));
        assert_eq!(parse(r"'keep \d'").unwrap(), s(r"keep \d"));
    }

    #[test]
    fn test_raw_and_prefixed_strings() {
        assert_eq!(parse(r"r'C:\new'").unwrap(), s(r"C:\new"));
        assert_eq!(parse("u'x'").unwrap(), s("x"));
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        assert_eq!(parse("'''one\ntwo'''").unwrap(), s("one\ntwo"));
        assert_eq!(
            parse("\"\"\"say \"hi\" now\"\"\"").unwrap(),
            s("say \"hi\" now")
        );
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert_eq!(parse("'Data ' \"Engineer\"").unwrap(), s("Data Engineer"));
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(parse("''").unwrap(), s(""));
        assert_eq!(
            parse("['', \"\"]").unwrap(),
            Literal::List(vec![s(""), s("")])
        );
    }

    #[test]
    fn test_rejects_names_and_calls() {
        assert!(matches!(
            parse("__import__('os')"),
            Err(LiteralError::UnknownName { .. })
        ));
        assert!(matches!(
            parse("not a dict"),
            Err(LiteralError::UnknownName { .. })
        ));
        assert!(parse("{'a': open('x')}").is_err());
    }

    #[test]
    fn test_rejects_set_literals() {
        assert!(matches!(
            parse("{'a', 'b'}"),
            Err(LiteralError::Unexpected { found: ',', .. })
        ));
    }

    #[test]
    fn test_rejects_unterminated_string() {
        assert_eq!(
            parse("'abc"),
            Err(LiteralError::UnterminatedString(0))
        );
        assert_eq!(
            parse("'ab\ncd'"),
            Err(LiteralError::UnterminatedString(0))
        );
    }

    #[test]
    fn test_integer_beyond_i64_keeps_its_digits() {
        let value = parse("10000000000000000000").unwrap();
        assert_eq!(value, Literal::BigInt("10000000000000000000".to_string()));
        assert_eq!(value.kind(), "integer");
        assert_eq!(value.scalar_text().as_deref(), Some("10000000000000000000"));
        assert_eq!(
            parse("-99_999_999_999_999_999_999").unwrap(),
            Literal::BigInt("-99999999999999999999".to_string())
        );
        assert_eq!(parse("9223372036854775807").unwrap(), Literal::Int(i64::MAX));
    }

    #[test]
    fn test_rejects_trailing_input() {
        assert_eq!(parse("[1] [2]"), Err(LiteralError::TrailingInput(4)));
    }

    #[test]
    fn test_rejects_bare_sign() {
        assert!(matches!(parse("-"), Err(LiteralError::InvalidNumber { .. })));
    }

    #[test]
    fn test_rejects_excessive_nesting() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(LiteralError::TooDeep));
    }

    #[test]
    fn test_parse_prefix_stops_after_literal() {
        let (value, end) = parse_prefix("{'a': 1} and then prose").unwrap();
        assert_eq!(value, Literal::Dict(vec![(s("a"), Literal::Int(1))]));
        assert_eq!(end, 8);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(s("x").scalar_text().as_deref(), Some("x"));
        assert_eq!(Literal::Int(5).scalar_text().as_deref(), Some("5"));
        assert_eq!(Literal::Float(5.0).scalar_text().as_deref(), Some("5.0"));
        assert_eq!(Literal::Float(2.5).scalar_text().as_deref(), Some("2.5"));
        assert_eq!(Literal::Bool(true).scalar_text().as_deref(), Some("True"));
        assert_eq!(Literal::None.scalar_text().as_deref(), Some(""));
        assert!(Literal::List(vec![]).scalar_text().is_none());
    }
}
