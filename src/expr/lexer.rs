//! Tokenizer for attribute expressions.
//!
//! Operators and keywords that are never allowed still get their own tokens,
//! so the parser can reject them by name instead of with a generic error.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::GrammarError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Name(String),
    Number(f64),
    Str(String),
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    /// Operator outside the allow-list, kept verbatim for the error message.
    Forbidden(&'static str),
    /// Reserved word outside the allow-list.
    Reserved(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Token::Name(n) => write!(f, "name '{n}'"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::True => write!(f, "'True'"),
            Token::False => write!(f, "'False'"),
            Token::None => write!(f, "'None'"),
            Token::And => write!(f, "'and'"),
            Token::Or => write!(f, "'or'"),
            Token::Not => write!(f, "'not'"),
            Token::In => write!(f, "'in'"),
            Token::Eq => write!(f, "'=='"),
            Token::NotEq => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::LtE => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::GtE => write!(f, "'>='"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Forbidden(op) => write!(f, "'{op}'"),
            Token::Reserved(word) => write!(f, "'{word}'"),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

const RESERVED_WORDS: &[&str] = &[
    "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif", "else",
    "except", "finally", "for", "from", "global", "if", "import", "is", "lambda", "nonlocal",
    "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Multi-character operators first so the longest match wins.
const OPERATORS: &[&str] = &[
    "**", "//", "<<", ">>", ":=", "->", "==", "!=", "<=", ">=", "<", ">", "(", ")", "[", "]", "{",
    "}", ",", ":", "+", "-", "*", "/", "%", "@", "&", "|", "^", "~", "=", ".", ";",
];

fn operator_token(text: &'static str) -> Token {
    match text {
        "==" => Token::Eq,
        "!=" => Token::NotEq,
        "<=" => Token::LtE,
        ">=" => Token::GtE,
        "<" => Token::Lt,
        ">" => Token::Gt,
        "(" => Token::LParen,
        ")" => Token::RParen,
        "[" => Token::LBracket,
        "]" => Token::RBracket,
        "{" => Token::LBrace,
        "}" => Token::RBrace,
        "," => Token::Comma,
        ":" => Token::Colon,
        other => Token::Forbidden(other),
    }
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, GrammarError> {
    Lexer {
        source,
        chars: source.char_indices().peekable(),
    }
    .run()
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Spanned>, GrammarError> {
        let mut tokens = Vec::new();
        let mut brackets = 0usize;
        while let Some(&(offset, c)) = self.chars.peek() {
            let token = if matches!(c, ' ' | '\t' | '\x0c') {
                self.chars.next();
                continue;
            } else if matches!(c, '\n' | '\r') {
                // A line break only joins lines inside brackets; leading and
                // trailing blank lines are fine.
                if brackets == 0 && !tokens.is_empty() && !self.only_blank_after(offset) {
                    return Err(GrammarError::LineBreak(offset));
                }
                self.chars.next();
                continue;
            } else if c == '#' {
                return Err(GrammarError::Disallowed {
                    construct: "comment".to_string(),
                    offset,
                });
            } else if c == '_' || c.is_ascii_alphabetic() {
                self.word(offset)
            } else if c.is_ascii_digit() || (c == '.' && self.digit_follows(offset)) {
                self.number(offset)?
            } else if c == '"' || c == '\'' {
                self.string(offset, c)?
            } else {
                self.operator(offset, c)?
            };
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => brackets += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    brackets = brackets.saturating_sub(1)
                }
                _ => {}
            }
            tokens.push(Spanned { token, offset });
        }
        Ok(tokens)
    }

    fn only_blank_after(&self, offset: usize) -> bool {
        self.source[offset..]
            .chars()
            .all(|c| matches!(c, ' ' | '\t' | '\x0c' | '\n' | '\r'))
    }

    fn digit_follows(&self, offset: usize) -> bool {
        self.source[offset + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn take_while(&mut self, start: usize, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        &self.source[start..end]
    }

    fn word(&mut self, start: usize) -> Token {
        let word = self.take_while(start, |c| c == '_' || c.is_ascii_alphanumeric());
        match word {
            "True" => Token::True,
            "False" => Token::False,
            "None" => Token::None,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            w if RESERVED_WORDS.contains(&w) => Token::Reserved(w.to_string()),
            w => Token::Name(w.to_string()),
        }
    }

    fn number(&mut self, start: usize) -> Result<Token, GrammarError> {
        let mut prev = '\0';
        let literal = self.take_while(start, |c| {
            let accept = c.is_ascii_alphanumeric()
                || c == '_'
                || c == '.'
                || ((c == '+' || c == '-') && matches!(prev, 'e' | 'E'));
            prev = c;
            accept
        });
        let invalid = || GrammarError::InvalidNumber {
            literal: literal.to_string(),
            offset: start,
        };
        if literal.starts_with('_')
            || literal.ends_with('_')
            || literal.contains("__")
            || literal.contains("_.")
            || literal.contains("._")
            || ["_e", "_E", "e_", "E_", "+_", "-_"]
                .iter()
                .any(|pair| literal.contains(pair))
        {
            return Err(invalid());
        }
        let cleaned = literal.replace('_', "");
        if !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            return Err(invalid());
        }
        cleaned.parse::<f64>().map(Token::Number).map_err(|_| invalid())
    }

    fn string(&mut self, start: usize, quote: char) -> Result<Token, GrammarError> {
        self.chars.next();
        let mut out = String::new();
        loop {
            let Some((i, c)) = self.chars.next() else {
                return Err(GrammarError::UnterminatedString(start));
            };
            match c {
                c if c == quote => return Ok(Token::Str(out)),
                '\n' => return Err(GrammarError::UnterminatedString(start)),
                '\\' => out.push(self.escape(i)?),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, offset: usize) -> Result<char, GrammarError> {
        let Some((_, c)) = self.chars.next() else {
            return Err(GrammarError::InvalidEscape(offset));
        };
        let escaped = match c {
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'x' => self.hex_escape(offset, 2)?,
            'u' => self.hex_escape(offset, 4)?,
            _ => return Err(GrammarError::InvalidEscape(offset)),
        };
        Ok(escaped)
    }

    fn hex_escape(&mut self, offset: usize, digits: usize) -> Result<char, GrammarError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or(GrammarError::InvalidEscape(offset))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(GrammarError::InvalidEscape(offset))
    }

    fn operator(&mut self, offset: usize, c: char) -> Result<Token, GrammarError> {
        let rest = &self.source[offset..];
        let Some(&text) = OPERATORS.iter().find(|text| rest.starts_with(**text)) else {
            return Err(GrammarError::UnexpectedChar { found: c, offset });
        };
        for _ in 0..text.len() {
            self.chars.next();
        }
        Ok(operator_token(text))
    }
}
