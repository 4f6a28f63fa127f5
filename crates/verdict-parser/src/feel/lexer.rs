//! FEEL tokenizer
//!
//! Shared by the full grammar parser and the fast path, so both see exactly
//! the same token stream for a given input.

use crate::error::{ParseError, Result};
use std::fmt;

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    Or,
    Not,
    True,
    False,
    Null,
    If,
    Then,
    Else,
    Some,
    Every,
    In,
    Satisfies,
    For,
    Return,
    Between,
    Instance,
    Of,
    Function,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "if" => Keyword::If,
            "then" => Keyword::Then,
            "else" => Keyword::Else,
            "some" => Keyword::Some,
            "every" => Keyword::Every,
            "in" => Keyword::In,
            "satisfies" => Keyword::Satisfies,
            "for" => Keyword::For,
            "return" => Keyword::Return,
            "between" => Keyword::Between,
            "instance" => Keyword::Instance,
            "of" => Keyword::Of,
            "function" => Keyword::Function,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
            Keyword::Some => "some",
            Keyword::Every => "every",
            Keyword::In => "in",
            Keyword::Satisfies => "satisfies",
            Keyword::For => "for",
            Keyword::Return => "return",
            Keyword::Between => "between",
            Keyword::Instance => "instance",
            Keyword::Of => "of",
            Keyword::Function => "function",
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric literal text, exactly as written
    Number(String),
    /// String literal with escapes resolved
    String(String),
    /// Identifier, including the `?` placeholder
    Name(String),
    Keyword(Keyword),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    DotDot,
    Colon,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(text) => write!(f, "number {}", text),
            TokenKind::String(s) => write!(f, "string {:?}", s),
            TokenKind::Name(name) => write!(f, "name '{}'", name),
            TokenKind::Keyword(k) => write!(f, "'{}'", k.as_str()),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::StarStar => write!(f, "'**'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::DotDot => write!(f, "'..'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Token with its character offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
    /// First source character of the token (`None` at end of input)
    pub character: Option<char>,
}

/// Tokenize a FEEL source string. The result always ends with `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let peek = chars.get(pos + 1).copied();
        let kind = match c {
            '0'..='9' => {
                let (text, end) = lex_number(&chars, pos);
                pos = end;
                TokenKind::Number(text)
            }
            '"' => {
                let (text, end) = lex_string(&chars, pos)?;
                pos = end;
                TokenKind::String(text)
            }
            '?' => {
                pos += 1;
                TokenKind::Name("?".to_string())
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = pos;
                while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                let word: String = chars[pos..end].iter().collect();
                pos = end;
                match Keyword::from_word(&word) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Name(word),
                }
            }
            _ => {
                let (kind, width) = match (c, peek) {
                    ('*', Some('*')) => (TokenKind::StarStar, 2),
                    ('!', Some('=')) => (TokenKind::NotEq, 2),
                    ('<', Some('=')) => (TokenKind::Le, 2),
                    ('>', Some('=')) => (TokenKind::Ge, 2),
                    ('.', Some('.')) => (TokenKind::DotDot, 2),
                    ('+', _) => (TokenKind::Plus, 1),
                    ('-', _) => (TokenKind::Minus, 1),
                    ('*', _) => (TokenKind::Star, 1),
                    ('/', _) => (TokenKind::Slash, 1),
                    ('%', _) => (TokenKind::Percent, 1),
                    ('=', _) => (TokenKind::Eq, 1),
                    ('<', _) => (TokenKind::Lt, 1),
                    ('>', _) => (TokenKind::Gt, 1),
                    ('(', _) => (TokenKind::LParen, 1),
                    (')', _) => (TokenKind::RParen, 1),
                    ('[', _) => (TokenKind::LBracket, 1),
                    (']', _) => (TokenKind::RBracket, 1),
                    ('{', _) => (TokenKind::LBrace, 1),
                    ('}', _) => (TokenKind::RBrace, 1),
                    (',', _) => (TokenKind::Comma, 1),
                    ('.', _) => (TokenKind::Dot, 1),
                    (':', _) => (TokenKind::Colon, 1),
                    _ => return Err(ParseError::at(format!("unexpected character '{}'", c), Some(c), pos)),
                };
                pos += width;
                kind
            }
        };

        tokens.push(Token {
            kind,
            position: start,
            character: Some(c),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: chars.len(),
        character: None,
    });
    Ok(tokens)
}

/// Digits with an optional fraction and exponent. A `.` only starts a
/// fraction when a digit follows, so `1..5` lexes as `1`, `..`, `5`.
fn lex_number(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    let digits = |mut i: usize| {
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    end = digits(end);
    if chars.get(end) == Some(&'.') && chars.get(end + 1).map_or(false, |c| c.is_ascii_digit()) {
        end = digits(end + 1);
    }
    if matches!(chars.get(end), Some('e') | Some('E')) {
        let mut exp = end + 1;
        if matches!(chars.get(exp), Some('+') | Some('-')) {
            exp += 1;
        }
        if chars.get(exp).map_or(false, |c| c.is_ascii_digit()) {
            end = digits(exp);
        }
    }

    (chars[start..end].iter().collect(), end)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut pos = start + 1;

    while pos < chars.len() {
        match chars[pos] {
            '"' => return Ok((out, pos + 1)),
            '\\' => {
                let escaped = chars.get(pos + 1).copied();
                let resolved = match escaped {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('u') => {
                        let hex: String = chars.iter().skip(pos + 2).take(4).collect();
                        let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                        match decoded {
                            Some(ch) if hex.len() == 4 => {
                                out.push(ch);
                                pos += 6;
                                continue;
                            }
                            _ => {
                                return Err(ParseError::at("invalid unicode escape", Some('u'), pos + 1))
                            }
                        }
                    }
                    other => {
                        return Err(ParseError::at("invalid escape sequence", other, pos + 1));
                    }
                };
                out.push(resolved);
                pos += 2;
            }
            c => {
                out.push(c);
                pos += 1;
            }
        }
    }

    Err(ParseError::at("unterminated string literal", Some('"'), start))
}
