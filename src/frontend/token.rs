//! Token definitions for Tally

use serde::Serialize;
use std::fmt;

use crate::utils::wire::{escape_field, split_fields, unescape_field};
use crate::utils::{Error, Location, Result};

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text the token was matched from
    pub literal: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, location: Location) -> Self {
        Self { kind, literal: literal.into(), location }
    }

    pub fn eof(location: Location) -> Self {
        Self { kind: TokenKind::Eof, literal: String::new(), location }
    }

    /// One line of the token stream: `<Kind> <literal> <file> <line> <column>`
    pub fn to_wire(&self) -> String {
        format!(
            "{} {} {}",
            self.kind.name(),
            escape_field(&self.literal),
            self.location.encode()
        )
    }

    /// Inverse of [`Token::to_wire`]
    pub fn from_wire(line: &str) -> std::result::Result<Self, String> {
        let fields = split_fields(line);
        if fields.len() != 5 {
            return Err(format!("expected 5 token fields, got {}", fields.len()));
        }
        let kind = TokenKind::from_name(fields[0])
            .ok_or_else(|| format!("unknown token kind {:?}", fields[0]))?;
        let literal = unescape_field(fields[1])?;
        let location = Location::decode(&fields[2..])?;
        Ok(Self { kind, literal, location })
    }
}

/// Decode a whole token stream, one token per line. Blank lines are skipped.
pub fn decode_tokens(text: &str) -> Result<Vec<Token>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| Token::from_wire(line).map_err(|msg| Error::decode(i + 1, msg)))
        .collect()
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ============ Literals ============
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    Identifier,

    // ============ Operators ============
    /// +
    Add,
    /// ++
    Increment,
    /// -
    Subtract,
    /// --
    Decrement,
    /// *
    Multiply,
    /// /
    Divide,
    /// <
    LessThan,
    /// >
    GreaterThan,
    /// ==
    EqualTo,
    /// =
    Assignment,

    // ============ Keywords ============
    For,
    If,
    Else,
    Return,
    Break,
    Continue,
    Var,

    // ============ Separators ============
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// (
    OpenBracket,
    /// )
    CloseBracket,
    /// {
    OpenCurlyBracket,
    /// }
    CloseCurlyBracket,
    /// [
    OpenSquareBracket,
    /// ]
    CloseSquareBracket,

    // ============ Special ============
    /// End of input
    #[serde(rename = "EOF")]
    Eof,
}

/// Every kind, in wire-name lookup order
const ALL_KINDS: [TokenKind; 30] = [
    TokenKind::IntLiteral,
    TokenKind::FloatLiteral,
    TokenKind::StringLiteral,
    TokenKind::Identifier,
    TokenKind::Add,
    TokenKind::Increment,
    TokenKind::Subtract,
    TokenKind::Decrement,
    TokenKind::Multiply,
    TokenKind::Divide,
    TokenKind::LessThan,
    TokenKind::GreaterThan,
    TokenKind::EqualTo,
    TokenKind::Assignment,
    TokenKind::For,
    TokenKind::If,
    TokenKind::Else,
    TokenKind::Return,
    TokenKind::Break,
    TokenKind::Continue,
    TokenKind::Var,
    TokenKind::Semicolon,
    TokenKind::Comma,
    TokenKind::OpenBracket,
    TokenKind::CloseBracket,
    TokenKind::OpenCurlyBracket,
    TokenKind::CloseCurlyBracket,
    TokenKind::OpenSquareBracket,
    TokenKind::CloseSquareBracket,
    TokenKind::Eof,
];

/// Reserved words; the automaton builds one state chain per entry
pub const KEYWORDS: [(&str, TokenKind); 7] = [
    ("for", TokenKind::For),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("return", TokenKind::Return),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("var", TokenKind::Var),
];

/// Binding strength of a token in infix position, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// < > ==
    Equality,
    /// + -
    Sum,
    /// * /
    Product,
    /// ++ --
    Unary,
    /// ( [
    Call,
}

impl TokenKind {
    /// Name used in the token stream
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::IntLiteral => "IntLiteral",
            TokenKind::FloatLiteral => "FloatLiteral",
            TokenKind::StringLiteral => "StringLiteral",
            TokenKind::Identifier => "Identifier",
            TokenKind::Add => "Add",
            TokenKind::Increment => "Increment",
            TokenKind::Subtract => "Subtract",
            TokenKind::Decrement => "Decrement",
            TokenKind::Multiply => "Multiply",
            TokenKind::Divide => "Divide",
            TokenKind::LessThan => "LessThan",
            TokenKind::GreaterThan => "GreaterThan",
            TokenKind::EqualTo => "EqualTo",
            TokenKind::Assignment => "Assignment",
            TokenKind::For => "For",
            TokenKind::If => "If",
            TokenKind::Else => "Else",
            TokenKind::Return => "Return",
            TokenKind::Break => "Break",
            TokenKind::Continue => "Continue",
            TokenKind::Var => "Var",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Comma => "Comma",
            TokenKind::OpenBracket => "OpenBracket",
            TokenKind::CloseBracket => "CloseBracket",
            TokenKind::OpenCurlyBracket => "OpenCurlyBracket",
            TokenKind::CloseCurlyBracket => "CloseCurlyBracket",
            TokenKind::OpenSquareBracket => "OpenSquareBracket",
            TokenKind::CloseSquareBracket => "CloseSquareBracket",
            TokenKind::Eof => "EOF",
        }
    }

    pub fn from_name(name: &str) -> Option<TokenKind> {
        ALL_KINDS.iter().copied().find(|kind| kind.name() == name)
    }

    /// Get the precedence of a token in infix position (for Pratt parsing).
    /// Tokens that never continue an expression sit at `Lowest`.
    pub fn precedence(self) -> Precedence {
        match self {
            TokenKind::LessThan | TokenKind::GreaterThan | TokenKind::EqualTo => Precedence::Equality,
            TokenKind::Add | TokenKind::Subtract => Precedence::Sum,
            TokenKind::Multiply | TokenKind::Divide => Precedence::Product,
            TokenKind::Increment | TokenKind::Decrement => Precedence::Unary,
            TokenKind::OpenBracket | TokenKind::OpenSquareBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ALL_KINDS {
            assert_eq!(TokenKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TokenKind::from_name("Plus"), None);
    }

    #[test]
    fn test_precedence_order() {
        assert!(TokenKind::Add.precedence() > TokenKind::EqualTo.precedence());
        assert!(TokenKind::Multiply.precedence() > TokenKind::Subtract.precedence());
        assert!(TokenKind::OpenBracket.precedence() > TokenKind::Increment.precedence());
        assert_eq!(TokenKind::Semicolon.precedence(), Precedence::Lowest);
    }

    #[test]
    fn test_wire_format() {
        let token = Token::new(TokenKind::StringLiteral, "\"a b\"", Location::new("x y.tl", 2, 4));
        let line = token.to_wire();
        assert_eq!(line, "StringLiteral \"a\\sb\" x\u{200B}y.tl 2 4");
        assert_eq!(Token::from_wire(&line).unwrap(), token);
    }

    #[test]
    fn test_eof_wire_format_has_empty_literal() {
        let token = Token::eof(Location::new("stdin", 1, 9));
        assert_eq!(token.to_wire(), "EOF  stdin 1 9");
        assert_eq!(Token::from_wire("EOF  stdin 1 9").unwrap(), token);
    }

    #[test]
    fn test_decode_tokens_reports_line() {
        let text = "Identifier x f 1 1\nBogus y f 1 3\n";
        match decode_tokens(text) {
            Err(Error::Decode { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}
