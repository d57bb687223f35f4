use std::sync::OnceLock;

use regex::Regex;

use crate::errors::ParseErrorKind;
use crate::model::{Formula, NodeType};

/// Turns preprocessor lines into node types and feature formulas
///
/// Implementations only see the text of one logical line, without the diff
/// prefix.
pub trait AnnotationParser {
    /// Annotation type of `line`, or `None` for plain code
    ///
    /// # Errors
    /// * `InvalidMacroName` - If the line looks like a macro but names no annotation
    fn annotation_type(&self, line: &str) -> Result<Option<NodeType>, ParseErrorKind>;

    /// Feature formula of an `#if`-like line
    ///
    /// # Errors
    /// * `IfWithoutCondition` - If the macro has no expression
    /// * `UnparseableFormula` - If the expression is malformed
    fn parse_condition(&self, line: &str) -> Result<Formula, ParseErrorKind>;
}

/// C preprocessor annotations
///
/// Understands `#if`, `#ifdef`, `#ifndef`, `#elif`, `#elifdef`,
/// `#elifndef`, `#else` and `#endif`. Conditions are parsed into formulas
/// over `||`, `&&`, `!`, parentheses, `defined` and integer constants;
/// anything else (comparisons, macro calls) becomes an opaque literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppAnnotationParser;

const MACRO_PATTERN: &str = r"^\s*#\s*(if|elif|else|endif)";
const CONDITION_PATTERN: &str =
    r"^\s*#\s*(ifdef|ifndef|elifdef|elifndef|if|elif)(?:\s+(.*)|(\(.*\)))?$";

static MACRO_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static CONDITION_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn cached_regex(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex, ParseErrorKind> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| ParseErrorKind::UnparseableFormula {
            reason: format!("invalid pattern: {}", e),
        })
}

impl AnnotationParser for CppAnnotationParser {
    fn annotation_type(&self, line: &str) -> Result<Option<NodeType>, ParseErrorKind> {
        let regex = cached_regex(&MACRO_REGEX, MACRO_PATTERN)?;
        let Some(captures) = regex.captures(line) else {
            return Ok(None);
        };
        let name = captures.get(1).map_or("", |m| m.as_str());
        match NodeType::from_name(name) {
            Some(node_type) if node_type.is_annotation() => Ok(Some(node_type)),
            _ => Err(ParseErrorKind::InvalidMacroName {
                name: name.to_string(),
            }),
        }
    }

    fn parse_condition(&self, line: &str) -> Result<Formula, ParseErrorKind> {
        let text = strip_comments(line);
        let regex = cached_regex(&CONDITION_REGEX, CONDITION_PATTERN)?;
        let captures =
            regex
                .captures(text.trim_end())
                .ok_or_else(|| ParseErrorKind::UnparseableFormula {
                    reason: format!("not a conditional macro: {}", line.trim()),
                })?;

        let keyword = captures.get(1).map_or("", |m| m.as_str());
        let expression = captures
            .get(2)
            .or_else(|| captures.get(3))
            .map_or("", |m| m.as_str())
            .trim();
        if expression.is_empty() {
            return Err(ParseErrorKind::IfWithoutCondition);
        }

        let formula = ExpressionParser::new(expression)?.parse()?;
        match keyword {
            "ifndef" | "elifndef" => Ok(formula.negate()),
            _ => Ok(formula),
        }
    }
}

/// Remove `/* */` and `//` comments; an unterminated block comment runs to the end
fn strip_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        let block = rest.find("/*");
        let trailing = rest.find("//");
        match (block, trailing) {
            (Some(b), t) if t.map_or(true, |t| b < t) => {
                out.push_str(&rest[..b]);
                out.push(' ');
                match rest[b + 2..].find("*/") {
                    Some(end) => rest = &rest[b + 2 + end + 2..],
                    None => return out,
                }
            }
            (_, Some(t)) => {
                out.push_str(&rest[..t]);
                return out;
            }
            _ => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Or,
    And,
    Not,
    Open,
    Close,
    Ident,
    Number,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let rest = &bytes[i..];
        let kind = if rest.starts_with(b"||") {
            i += 2;
            TokenKind::Or
        } else if rest.starts_with(b"&&") {
            i += 2;
            TokenKind::And
        } else if [b"!=", b"==", b"<=", b">=", b"<<", b">>"]
            .iter()
            .any(|op| rest.starts_with(*op))
        {
            i += 2;
            TokenKind::Other
        } else if c == b'!' {
            i += 1;
            TokenKind::Not
        } else if c == b'(' {
            i += 1;
            TokenKind::Open
        } else if c == b')' {
            i += 1;
            TokenKind::Close
        } else if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            TokenKind::Ident
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.') {
                i += 1;
            }
            TokenKind::Number
        } else {
            // Keep multi-byte characters whole
            i += text[i..].chars().next().map_or(1, char::len_utf8);
            TokenKind::Other
        };
        tokens.push(Token {
            kind,
            start,
            end: i,
        });
    }
    tokens
}

/// Recursive descent over `or := and ('||' and)*`, `and := unary ('&&' unary)*`,
/// `unary := '!' unary | '(' or ')' | defined | atom`
struct ExpressionParser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> ExpressionParser<'a> {
    fn new(text: &'a str) -> Result<Self, ParseErrorKind> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(ParseErrorKind::IfWithoutCondition);
        }
        Ok(Self {
            text,
            tokens,
            pos: 0,
        })
    }

    fn parse(mut self) -> Result<Formula, ParseErrorKind> {
        let formula = self.parse_or()?;
        match self.peek() {
            None => Ok(formula),
            Some(token) => Err(self.unexpected(token)),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn slice(&self, token: Token) -> &'a str {
        &self.text[token.start..token.end]
    }

    fn unexpected(&self, token: Token) -> ParseErrorKind {
        ParseErrorKind::UnparseableFormula {
            reason: format!("unexpected '{}' in '{}'", self.slice(token), self.text),
        }
    }

    fn end_of_input(&self) -> ParseErrorKind {
        ParseErrorKind::UnparseableFormula {
            reason: format!("unexpected end of '{}'", self.text),
        }
    }

    fn parse_or(&mut self) -> Result<Formula, ParseErrorKind> {
        let mut clauses = vec![self.parse_and()?];
        while self.peek().map(|t| t.kind) == Some(TokenKind::Or) {
            self.pos += 1;
            clauses.push(self.parse_and()?);
        }
        Ok(Formula::or_all(clauses))
    }

    fn parse_and(&mut self) -> Result<Formula, ParseErrorKind> {
        let mut clauses = vec![self.parse_unary()?];
        while self.peek().map(|t| t.kind) == Some(TokenKind::And) {
            self.pos += 1;
            clauses.push(self.parse_unary()?);
        }
        Ok(Formula::and_all(clauses))
    }

    fn parse_unary(&mut self) -> Result<Formula, ParseErrorKind> {
        let token = self.peek().ok_or_else(|| self.end_of_input())?;
        match token.kind {
            TokenKind::Not => {
                self.pos += 1;
                Ok(self.parse_unary()?.negate())
            }
            TokenKind::Open => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect_close()?;
                Ok(inner)
            }
            TokenKind::Ident if self.slice(token) == "defined" => self.parse_defined(),
            TokenKind::Or | TokenKind::And | TokenKind::Close => Err(self.unexpected(token)),
            TokenKind::Ident | TokenKind::Number | TokenKind::Other => self.parse_atom(),
        }
    }

    fn expect_close(&mut self) -> Result<(), ParseErrorKind> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Close => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(self.unexpected(token)),
            None => Err(ParseErrorKind::UnparseableFormula {
                reason: format!("missing ')' in '{}'", self.text),
            }),
        }
    }

    fn parse_defined(&mut self) -> Result<Formula, ParseErrorKind> {
        self.pos += 1;
        let parenthesized = self.peek().map(|t| t.kind) == Some(TokenKind::Open);
        if parenthesized {
            self.pos += 1;
        }
        let name = match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => token,
            Some(token) => return Err(self.unexpected(token)),
            None => return Err(self.end_of_input()),
        };
        self.pos += 1;
        if parenthesized {
            self.expect_close()?;
        }
        Ok(Formula::literal(self.slice(name)))
    }

    /// Maximal run of tokens up to a top-level `||`, `&&` or unmatched `)`
    fn parse_atom(&mut self) -> Result<Formula, ParseErrorKind> {
        let first = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Or | TokenKind::And if depth == 0 => break,
                TokenKind::Close if depth == 0 => break,
                TokenKind::Close => depth -= 1,
                TokenKind::Open => depth += 1,
                _ => {}
            }
            self.pos += 1;
        }
        if depth > 0 {
            return Err(ParseErrorKind::UnparseableFormula {
                reason: format!("missing ')' in '{}'", self.text),
            });
        }

        let tokens = &self.tokens[first..self.pos];
        if let [single] = tokens {
            match single.kind {
                TokenKind::Ident => return Ok(Formula::literal(self.slice(*single))),
                TokenKind::Number => {
                    if let Some(value) = parse_integer(self.slice(*single)) {
                        return Ok(if value == 0 {
                            Formula::False
                        } else {
                            Formula::True
                        });
                    }
                }
                _ => {}
            }
        }

        let start = tokens.first().map_or(0, |t| t.start);
        let end = tokens.last().map_or(0, |t| t.end);
        let normalized = self.text[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Formula::literal(normalized))
    }
}

/// Integer constant with optional `0x` prefix and `u`/`l` suffixes
fn parse_integer(text: &str) -> Option<u64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()
    } else {
        digits.parse().ok()
    }
}
