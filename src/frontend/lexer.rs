//! Lexer for Tally
//!
//! Converts source code into a stream of tokens by running the shared
//! finite-state automaton from every position where a token can start.
//! Characters that cannot start any token (whitespace and the like) are
//! dropped.

use log::{debug, trace};

use crate::frontend::automaton::{automaton, Automaton, StateId};
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Location, Result};

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// File name recorded in every location
    file: String,
    line: u32,
    column: u32,
    automaton: &'static Automaton,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str, file: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            file: file.to_string(),
            line: 1,
            column: 1,
            automaton: automaton(),
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Advance to the next character, keeping line and column in step
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line, self.column)
    }

    /// Get the next token; `Eof` once the input is exhausted
    pub fn next_token(&mut self) -> Result<Token> {
        while let Some(c) = self.peek() {
            match self.automaton.start(c) {
                Some(start) => return self.match_token(start),
                None => {
                    self.advance();
                }
            }
        }
        Ok(Token::eof(self.location()))
    }

    /// Maximal munch from a start state. The walk follows transitions for as
    /// long as they match; the state it gets stuck in, or ends the input in,
    /// must be accepting.
    fn match_token(&mut self, start: StateId) -> Result<Token> {
        let begin = self.pos;
        let location = self.location();

        let mut state = start;
        self.advance();

        while let Some(c) = self.peek() {
            let Some(next) = self.automaton.step(state, c) else {
                break;
            };
            state = next;
            self.advance();
        }

        let Some(kind) = self.automaton.accepts(state) else {
            return Err(Error::Lex { location: self.location() });
        };

        let literal: String = self.source[begin..self.pos].iter().collect();
        trace!("{} {:?} at {}", kind, literal, location);
        Ok(Token::new(kind, literal, location))
    }

    /// Tokenize the entire source; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        debug!("lexed {} tokens from {}", tokens.len(), self.file);
        Ok(tokens)
    }
}

/// Tokenize `source`, recording `file` in every location
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>> {
    Lexer::new(source, file).tokenize()
}

/// Tokenize several `(file, source)` inputs into one stream. Only the
/// last file's `Eof` is kept, so the stream ends exactly once.
pub fn tokenize_files(inputs: &[(String, String)]) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut eof = Token::eof(Location::start_of("stdin"));
    for (file, source) in inputs {
        let mut file_tokens = tokenize(source, file)?;
        if let Some(last) = file_tokens.pop() {
            eof = last;
        }
        tokens.extend(file_tokens);
    }
    tokens.push(eof);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, "test").unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("var x = y + 1;", "test").unwrap();

        assert!(matches!(tokens[0].kind, TokenKind::Var));
        assert!(matches!(tokens[1].kind, TokenKind::Identifier if tokens[1].literal == "x"));
        assert!(matches!(tokens[2].kind, TokenKind::Assignment));
        assert!(matches!(tokens[3].kind, TokenKind::Identifier));
        assert!(matches!(tokens[4].kind, TokenKind::Add));
        assert!(matches!(tokens[5].kind, TokenKind::IntLiteral if tokens[5].literal == "1"));
        assert!(matches!(tokens[6].kind, TokenKind::Semicolon));
        assert!(matches!(tokens[7].kind, TokenKind::Eof));
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(kinds("++"), vec![TokenKind::Increment, TokenKind::Eof]);
        assert_eq!(kinds("=="), vec![TokenKind::EqualTo, TokenKind::Eof]);
        assert_eq!(
            kinds("+++"),
            vec![TokenKind::Increment, TokenKind::Add, TokenKind::Eof]
        );
        assert_eq!(
            kinds("+ +"),
            vec![TokenKind::Add, TokenKind::Add, TokenKind::Eof]
        );
    }

    #[test]
    fn test_locations() {
        let tokens = tokenize("a\nbb", "main.tl").unwrap();
        assert_eq!(tokens[0].location, Location::new("main.tl", 1, 1));
        assert_eq!(tokens[1].literal, "bb");
        assert_eq!(tokens[1].location, Location::new("main.tl", 2, 1));
        assert_eq!(tokens[2].location, Location::new("main.tl", 2, 3));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 3.14 1e3 2.5E2", "test").unwrap();

        assert!(matches!(tokens[0].kind, TokenKind::IntLiteral));
        assert!(matches!(tokens[1].kind, TokenKind::FloatLiteral if tokens[1].literal == "3.14"));
        assert!(matches!(tokens[2].kind, TokenKind::IntLiteral if tokens[2].literal == "1e3"));
        assert!(matches!(tokens[3].kind, TokenKind::FloatLiteral if tokens[3].literal == "2.5E2"));
    }

    #[test]
    fn test_stuck_in_non_accepting_state() {
        for source in ["1.", "1e", "1.x", "2.5e+"] {
            let err = tokenize(source, "test").unwrap_err();
            assert!(matches!(err, Error::Lex { .. }), "{:?} lexed", source);
        }
    }

    #[test]
    fn test_lex_error_location() {
        let err = tokenize("x = 1.\ny", "main.tl").unwrap_err();
        assert_eq!(err.location(), Some(&Location::new("main.tl", 1, 7)));
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#"println("hello \"you\" there")"#, "test").unwrap();

        assert!(matches!(tokens[0].kind, TokenKind::Identifier));
        assert!(matches!(tokens[1].kind, TokenKind::OpenBracket));
        assert!(matches!(tokens[2].kind, TokenKind::StringLiteral));
        assert_eq!(tokens[2].literal, r#""hello \"you\" there""#);
        assert!(matches!(tokens[3].kind, TokenKind::CloseBracket));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("x = \"never closed", "test").unwrap_err();
        assert!(matches!(err, Error::Lex { .. }));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("for if else return break continue var"),
            vec![
                TokenKind::For,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Return,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Var,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("iffy"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            kinds("; , ( ) { } [ ]"),
            vec![
                TokenKind::Semicolon,
                TokenKind::Comma,
                TokenKind::OpenBracket,
                TokenKind::CloseBracket,
                TokenKind::OpenCurlyBracket,
                TokenKind::CloseCurlyBracket,
                TokenKind::OpenSquareBracket,
                TokenKind::CloseSquareBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_stop_at_operators() {
        let tokens = tokenize("abc<d2", "test").unwrap();
        assert_eq!(tokens[0].literal, "abc");
        assert!(matches!(tokens[1].kind, TokenKind::LessThan));
        assert_eq!(tokens[2].literal, "d2");
    }

    #[test]
    fn test_zero_width_space_splits_identifiers() {
        let tokens = tokenize("a\u{200B}b", "test").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].literal, "a");
        assert_eq!(tokens[1].literal, "b");
        assert_eq!(tokens[1].location, Location::new("test", 1, 3));
    }

    #[test]
    fn test_files_share_one_eof() {
        let inputs = vec![
            ("a.tl".to_string(), "var a = 1".to_string()),
            ("b.tl".to_string(), "var b = 2".to_string()),
        ];
        let tokens = tokenize_files(&inputs).unwrap();

        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
        assert_eq!(tokens[4].location, Location::new("b.tl", 1, 1));
        assert_eq!(tokens[8].location, Location::new("b.tl", 1, 10));
    }
}
