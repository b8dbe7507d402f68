//! Parser for Tally
//!
//! Dedicated parsers for `if`, `for`, `var` and `{` statements; everything
//! else is an expression statement. Expressions use Pratt parsing: a prefix
//! rule per token kind, then infix rules for as long as the next token binds
//! tighter than the current floor.

use log::debug;

use crate::frontend::ast::*;
use crate::frontend::token::{Precedence, Token, TokenKind};
use crate::utils::{Error, Limits, Location, Result};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    limits: Limits,
}

impl Parser {
    /// Create a parser from a token stream. A missing trailing `Eof` is
    /// added so the cursor always has something to look at.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let location = tokens
                .last()
                .map(|t| t.location.clone())
                .unwrap_or_else(|| Location::start_of("stdin"));
            tokens.push(Token::eof(location));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof, and `advance` never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(Error::UnexpectedToken {
                expected: expected.name().to_string(),
                found: describe(self.current()),
                location: self.current().location.clone(),
            })
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.limits.max_depth {
            return Err(Error::RecursionTooDeep {
                limit: self.limits.max_depth,
                location: self.current().location.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ==================== Statements ====================

    /// Parse every statement up to `Eof`, which must be the last token. A
    /// lone statement is returned as-is; several are wrapped in a `Scope`.
    /// Stray `;` between statements are skipped.
    pub fn parse_program(&mut self) -> Result<Stmt> {
        let location = self.current().location.clone();
        let mut statements = Vec::new();

        loop {
            while self.check(TokenKind::Semicolon) {
                self.advance();
            }
            if self.check(TokenKind::Eof) {
                if let Some(extra) = self.tokens.get(self.pos + 1) {
                    return Err(Error::UnexpectedToken {
                        expected: "no tokens after EOF".to_string(),
                        found: describe(extra),
                        location: extra.location.clone(),
                    });
                }
                break;
            }
            statements.push(self.parse_statement()?);
        }

        debug!("parsed {} top-level statement(s)", statements.len());

        if statements.len() == 1 {
            if let Some(statement) = statements.pop() {
                return Ok(statement);
            }
        }
        Ok(Stmt::Scope { statements, location })
    }

    /// Parse exactly one statement
    pub fn parse_statement(&mut self) -> Result<Stmt> {
        self.enter()?;
        let result = match self.current_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Var => self.parse_var(),
            TokenKind::OpenCurlyBracket => self.parse_scope(),
            _ => self.parse_expression_statement(),
        };
        self.leave();
        result
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::If)?.location;

        let condition = self.parse_expression(Precedence::Lowest)?;
        let primary = Box::new(self.parse_statement()?);

        let alternative = if self.check(TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, primary, alternative, location })
    }

    /// `for pre ; condition ; post body`
    fn parse_for(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::For)?.location;

        let pre = Box::new(self.parse_statement()?);
        self.expect(TokenKind::Semicolon)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Semicolon)?;
        let post = Box::new(self.parse_statement()?);
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For { pre, condition, post, body, location })
    }

    /// `var place = value`
    fn parse_var(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::Var)?.location;

        let place = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Assignment)?;
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Stmt::Assignment { place, value, location })
    }

    fn parse_scope(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::OpenCurlyBracket)?.location;

        let mut statements = Vec::new();
        while !self.check(TokenKind::CloseCurlyBracket) {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Eof => {
                    self.expect(TokenKind::CloseCurlyBracket)?;
                }
                _ => statements.push(self.parse_statement()?),
            }
        }
        self.advance();

        Ok(Stmt::Scope { statements, location })
    }

    /// A bare expression, or `place = value` when an `=` follows it
    fn parse_expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.check(TokenKind::Assignment) {
            self.advance();
            let location = expr.location().clone();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Ok(Stmt::Assignment { place: expr, value, location });
        }

        Ok(Stmt::Expr(expr))
    }

    // ==================== Expression Parsing (Pratt) ====================

    /// Parse an expression whose infix operators all bind tighter than `floor`
    pub fn parse_expression(&mut self, floor: Precedence) -> Result<Expr> {
        self.enter()?;
        let result = self.parse_expression_inner(floor);
        self.leave();
        result
    }

    fn parse_expression_inner(&mut self, floor: Precedence) -> Result<Expr> {
        let mut left = self.parse_prefix()?;

        while floor < self.current_kind().precedence() {
            left = match self.current_kind() {
                TokenKind::Add
                | TokenKind::Subtract
                | TokenKind::Multiply
                | TokenKind::Divide
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::EqualTo => self.parse_operator(left)?,
                TokenKind::OpenBracket => self.parse_call(left)?,
                TokenKind::OpenSquareBracket => self.parse_index(left)?,
                // `++`/`--` bind like prefixes but have no infix form
                _ => break,
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                parse_int_literal(&token)
            }
            TokenKind::FloatLiteral => {
                self.advance();
                parse_float_literal(&token)
            }
            TokenKind::StringLiteral => {
                self.advance();
                Ok(Expr::StringLiteral {
                    value: unquote(&token.literal),
                    location: token.location,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                let location = token.location;
                Ok(match token.literal.as_str() {
                    "true" => Expr::BoolLiteral { value: true, location },
                    "false" => Expr::BoolLiteral { value: false, location },
                    _ => Expr::Identifier { name: token.literal, location },
                })
            }
            TokenKind::Subtract | TokenKind::Increment | TokenKind::Decrement => {
                self.advance();
                let operand = self.parse_expression(Precedence::Unary)?;
                Ok(Expr::UnaryOperator {
                    op: token.literal,
                    operand: Box::new(operand),
                    location: token.location,
                })
            }
            TokenKind::OpenBracket => {
                self.advance();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::CloseBracket)?;
                Ok(inner)
            }
            _ => Err(Error::NoPrefixRule {
                found: describe(&token),
                location: token.location,
            }),
        }
    }

    /// Binary operator; the right operand is parsed with the operator's own
    /// precedence as floor, so equal precedence chains to the left.
    fn parse_operator(&mut self, left: Expr) -> Result<Expr> {
        let token = self.advance();
        let right = self.parse_expression(token.kind.precedence())?;

        Ok(Expr::Operator {
            op: token.literal,
            left: Box::new(left),
            right: Box::new(right),
            location: token.location,
        })
    }

    fn parse_call(&mut self, function: Expr) -> Result<Expr> {
        let location = self.expect(TokenKind::OpenBracket)?.location;

        let mut arguments = Vec::new();
        if !self.check(TokenKind::CloseBracket) {
            arguments.push(self.parse_expression(Precedence::Lowest)?);
            while self.check(TokenKind::Comma) {
                self.advance();
                arguments.push(self.parse_expression(Precedence::Lowest)?);
            }
        }
        self.expect(TokenKind::CloseBracket)?;

        Ok(Expr::Call {
            function: Box::new(function),
            arguments,
            location,
        })
    }

    fn parse_index(&mut self, structure: Expr) -> Result<Expr> {
        let location = self.expect(TokenKind::OpenSquareBracket)?.location;

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::CloseSquareBracket)?;

        Ok(Expr::Index {
            structure: Box::new(structure),
            index: Box::new(index),
            location,
        })
    }
}

/// Parse a whole token stream as a program
pub fn parse(tokens: Vec<Token>, limits: Limits) -> Result<Stmt> {
    Parser::new(tokens).with_limits(limits).parse_program()
}

fn describe(token: &Token) -> String {
    if token.literal.is_empty() {
        token.kind.name().to_string()
    } else {
        format!("{} {:?}", token.kind, token.literal)
    }
}

/// Integer literals may carry a decimal exponent: `12e3` is 12000.
fn parse_int_literal(token: &Token) -> Result<Expr> {
    let invalid = || Error::InvalidLiteral {
        kind: "integer",
        literal: token.literal.clone(),
        location: token.location.clone(),
    };

    let text = token.literal.to_ascii_lowercase();
    let value = match text.split_once('e') {
        Some((coefficient, exponent)) => {
            let coefficient: i64 = coefficient.parse().map_err(|_| invalid())?;
            let exponent: u32 = exponent.parse().map_err(|_| invalid())?;
            10i64
                .checked_pow(exponent)
                .and_then(|scale| coefficient.checked_mul(scale))
                .ok_or_else(invalid)?
        }
        None => text.parse::<i64>().map_err(|_| invalid())?,
    };

    Ok(Expr::IntLiteral { value, location: token.location.clone() })
}

fn parse_float_literal(token: &Token) -> Result<Expr> {
    let value: f32 = token.literal.parse().map_err(|_| Error::InvalidLiteral {
        kind: "float",
        literal: token.literal.clone(),
        location: token.location.clone(),
    })?;
    Ok(Expr::FloatLiteral { value, location: token.location.clone() })
}

/// Strip the surrounding quotes and resolve backslash escapes
fn unquote(literal: &str) -> String {
    let body = literal.strip_prefix('"').unwrap_or(literal);
    let body = body.strip_suffix('"').unwrap_or(body);

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::{tokenize, tokenize_files};

    fn parse_source(source: &str) -> Result<Stmt> {
        parse(tokenize(source, "test")?, Limits::default())
    }

    fn parse_expr(source: &str) -> Expr {
        match parse_source(source).unwrap() {
            Stmt::Expr(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    /// Location-free rendering for shape assertions
    fn sexpr(expr: &Expr) -> String {
        match expr {
            Expr::IntLiteral { value, .. } => value.to_string(),
            Expr::FloatLiteral { value, .. } => format!("{}f", value),
            Expr::StringLiteral { value, .. } => format!("{:?}", value),
            Expr::BoolLiteral { value, .. } => value.to_string(),
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Call { function, arguments, .. } => {
                let mut parts = vec![sexpr(function)];
                parts.extend(arguments.iter().map(sexpr));
                format!("(call {})", parts.join(" "))
            }
            Expr::Index { structure, index, .. } => {
                format!("(index {} {})", sexpr(structure), sexpr(index))
            }
            Expr::Operator { op, left, right, .. } => {
                format!("({} {} {})", op, sexpr(left), sexpr(right))
            }
            Expr::UnaryOperator { op, operand, .. } => format!("({} {})", op, sexpr(operand)),
            Expr::Void { .. } => "void".to_string(),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(sexpr(&parse_expr("1+2*3")), "(+ 1 (* 2 3))");
        assert_eq!(sexpr(&parse_expr("1*2+3")), "(+ (* 1 2) 3)");
        assert_eq!(sexpr(&parse_expr("-1+2")), "(+ (- 1) 2)");
        assert_eq!(sexpr(&parse_expr("1 + 2 < 3 * 4")), "(< (+ 1 2) (* 3 4))");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(sexpr(&parse_expr("1-2-3")), "(- (- 1 2) 3)");
        assert_eq!(sexpr(&parse_expr("8/4/2")), "(/ (/ 8 4) 2)");
    }

    #[test]
    fn test_parenthesised_subexpression() {
        assert_eq!(sexpr(&parse_expr("(1+2)*3")), "(* (+ 1 2) 3)");
    }

    #[test]
    fn test_calls_and_indexing() {
        assert_eq!(sexpr(&parse_expr("f()")), "(call f)");
        assert_eq!(sexpr(&parse_expr("f(1, x + 2)")), "(call f 1 (+ x 2))");
        assert_eq!(sexpr(&parse_expr("println(string(i))")), "(call println (call string i))");
        assert_eq!(sexpr(&parse_expr("a[i + 1]")), "(index a (+ i 1))");
        assert_eq!(sexpr(&parse_expr("-f(2)")), "(- (call f 2))");
    }

    #[test]
    fn test_literals() {
        assert_eq!(sexpr(&parse_expr("12e3")), "12000");
        assert_eq!(sexpr(&parse_expr("2.5")), "2.5f");
        assert_eq!(sexpr(&parse_expr("true == false")), "(== true false)");
        assert_eq!(sexpr(&parse_expr(r#""a\tb \"c\"""#)), r#""a\tb \"c\"""#);
    }

    #[test]
    fn test_operator_location_is_operator_token() {
        let expr = parse_expr("1 +\n 2");
        assert_eq!(expr.location(), &Location::new("test", 1, 3));
    }

    #[test]
    fn test_if_else() {
        let stmt = parse_source("if x < 1 { println(\"a\") } else { println(\"b\") }").unwrap();
        let Stmt::If { condition, primary, alternative, location } = stmt else {
            panic!("expected if");
        };
        assert_eq!(sexpr(&condition), "(< x 1)");
        assert!(matches!(*primary, Stmt::Scope { ref statements, .. } if statements.len() == 1));
        assert!(alternative.is_some());
        assert_eq!(location, Location::new("test", 1, 1));
    }

    #[test]
    fn test_if_without_else() {
        let stmt = parse_source("if true x").unwrap();
        assert!(matches!(stmt, Stmt::If { alternative: None, .. }));
    }

    #[test]
    fn test_for_loop() {
        let stmt = parse_source("for var i = 0; i < 3; i = i + 1 { println(string(i)) }").unwrap();
        let Stmt::For { pre, condition, post, body, .. } = stmt else {
            panic!("expected for");
        };
        assert!(matches!(*pre, Stmt::Assignment { .. }));
        assert_eq!(sexpr(&condition), "(< i 3)");
        let Stmt::Assignment { place, value, .. } = *post else {
            panic!("expected assignment in post clause");
        };
        assert_eq!(sexpr(&place), "i");
        assert_eq!(sexpr(&value), "(+ i 1)");
        assert!(matches!(*body, Stmt::Scope { .. }));
    }

    #[test]
    fn test_var_assignment() {
        let stmt = parse_source("var x = 1 + 2").unwrap();
        let Stmt::Assignment { place, value, .. } = stmt else {
            panic!("expected assignment");
        };
        assert_eq!(sexpr(&place), "x");
        assert_eq!(sexpr(&value), "(+ 1 2)");
    }

    #[test]
    fn test_program_wraps_multiple_statements() {
        let stmt = parse_source("var x = 1; { x = 2; }").unwrap();
        let Stmt::Scope { statements, .. } = stmt else {
            panic!("expected scope");
        };
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[1], Stmt::Scope { ref statements, .. } if statements.len() == 1));
    }

    #[test]
    fn test_empty_block() {
        let stmt = parse_source("{}").unwrap();
        assert!(matches!(stmt, Stmt::Scope { ref statements, .. } if statements.is_empty()));
    }

    #[test]
    fn test_missing_closing_bracket() {
        let err = parse_source("(1 + 2").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken { ref expected, .. } if expected == "CloseBracket"
        ));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_source("{ var x = 1").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken { ref expected, ref found, .. }
                if expected == "CloseCurlyBracket" && found == "EOF"
        ));
    }

    #[test]
    fn test_no_prefix_rule() {
        let err = parse_source("* 2").unwrap_err();
        match err {
            Error::NoPrefixRule { location, .. } => assert_eq!(location, Location::new("test", 1, 1)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_for_requires_semicolons() {
        let err = parse_source("for var i = 0 i < 3; i = i + 1 {}").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { ref expected, .. } if expected == "Semicolon"));
    }

    #[test]
    fn test_integer_overflow_is_invalid_literal() {
        let err = parse_source("9e30").unwrap_err();
        assert!(matches!(err, Error::InvalidLiteral { kind: "integer", .. }));
    }

    #[test]
    fn test_depth_limit() {
        let source = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        let tokens = tokenize(&source, "test").unwrap();
        let err = parse(tokens, Limits::with_max_depth(10)).unwrap_err();
        assert!(matches!(err, Error::RecursionTooDeep { limit: 10, .. }));
    }

    #[test]
    fn test_tokens_without_eof() {
        let mut tokens = tokenize("x", "test").unwrap();
        tokens.pop();
        let stmt = Parser::new(tokens).parse_program().unwrap();
        assert!(matches!(stmt, Stmt::Expr(Expr::Identifier { .. })));
    }

    #[test]
    fn test_tokens_after_eof() {
        let mut tokens = tokenize("var a = 1", "a.tl").unwrap();
        tokens.extend(tokenize("var b = 2", "b.tl").unwrap());
        let err = Parser::new(tokens).parse_program().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken { ref found, ref location, .. }
                if found == "Var \"var\"" && *location == Location::new("b.tl", 1, 1)
        ));
    }

    #[test]
    fn test_multi_file_stream() {
        let inputs = vec![
            ("a.tl".to_string(), "var a = 1".to_string()),
            ("b.tl".to_string(), "var b = 2".to_string()),
        ];
        let stmt = parse(tokenize_files(&inputs).unwrap(), Limits::default()).unwrap();
        assert!(matches!(stmt, Stmt::Scope { ref statements, .. } if statements.len() == 2));
    }
}
