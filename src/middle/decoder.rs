//! Decoder for the canonical AST encoding
//!
//! Reads header lines in order; the leading kind name selects how many
//! payload fields and children follow. Anything that does not match the
//! encoder's output exactly is rejected with the offending line number.

use crate::frontend::ast::*;
use crate::utils::wire::{split_fields, unescape_field};
use crate::utils::{Error, Limits, Location, Result};

/// Decode one statement; only blank lines may follow it. Nodes nested
/// deeper than `limits.max_depth` are rejected.
pub fn decode_statement(text: &str, limits: Limits) -> Result<Stmt> {
    let mut decoder = Decoder::new(text, limits);
    let stmt = decoder.statement()?;
    decoder.finish()?;
    Ok(stmt)
}

/// One parsed header line
struct Header<'a> {
    kind: &'a str,
    payload: Vec<&'a str>,
    children: usize,
    location: Location,
    line: usize,
}

impl<'a> Header<'a> {
    fn parse(text: &'a str, line: usize) -> Result<Self> {
        let fields = split_fields(text);
        // kind, child count and three location fields at minimum
        if fields.len() < 5 {
            return Err(Error::decode(line, format!("malformed node header {:?}", text)));
        }
        let n = fields.len();
        let location = Location::decode(&fields[n - 3..]).map_err(|msg| Error::decode(line, msg))?;
        let children = fields[n - 4]
            .parse()
            .map_err(|_| Error::decode(line, format!("invalid child count {:?}", fields[n - 4])))?;

        Ok(Self {
            kind: fields[0],
            payload: fields[1..n - 4].to_vec(),
            children,
            location,
            line,
        })
    }

    fn error(&self, message: impl std::fmt::Display) -> Error {
        Error::decode(self.line, format!("{}: {}", self.kind, message))
    }

    /// Exactly one payload field
    fn payload(&self) -> Result<&'a str> {
        match self.payload.as_slice() {
            [field] => Ok(field),
            other => Err(self.error(format!("expected 1 payload field, got {}", other.len()))),
        }
    }

    fn expect_payload(&self, expected: &str) -> Result<()> {
        let found = self.payload()?;
        if found != expected {
            return Err(self.error(format!("expected payload {:?}, got {:?}", expected, found)));
        }
        Ok(())
    }

    fn expect_children(&self, expected: usize) -> Result<()> {
        if self.children != expected {
            return Err(self.error(format!("expected {} children, got {}", expected, self.children)));
        }
        Ok(())
    }

    fn text(&self) -> Result<String> {
        unescape_field(self.payload()?).map_err(|msg| self.error(msg))
    }
}

struct Decoder<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    depth: usize,
    limits: Limits,
}

impl<'a> Decoder<'a> {
    fn new(text: &'a str, limits: Limits) -> Self {
        Self { lines: text.lines().collect(), pos: 0, depth: 0, limits }
    }

    fn enter(&mut self, header: &Header<'a>) -> Result<()> {
        if self.depth >= self.limits.max_depth {
            return Err(Error::RecursionTooDeep {
                limit: self.limits.max_depth,
                location: header.location.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn next_header(&mut self) -> Result<Header<'a>> {
        let Some(text) = self.lines.get(self.pos).copied() else {
            return Err(Error::decode(self.pos + 1, "unexpected end of input"));
        };
        self.pos += 1;
        Header::parse(text, self.pos)
    }

    fn finish(&self) -> Result<()> {
        match self.lines[self.pos.min(self.lines.len())..]
            .iter()
            .position(|line| !line.trim().is_empty())
        {
            Some(offset) => Err(Error::decode(self.pos + offset + 1, "trailing input after node")),
            None => Ok(()),
        }
    }

    fn statement(&mut self) -> Result<Stmt> {
        let header = self.next_header()?;
        self.enter(&header)?;
        let result = self.statement_from(header);
        self.leave();
        result
    }

    fn statement_from(&mut self, header: Header<'a>) -> Result<Stmt> {
        match header.kind {
            "If" => {
                header.expect_payload("if")?;
                if header.children != 2 && header.children != 3 {
                    return Err(header.error(format!("expected 2 or 3 children, got {}", header.children)));
                }
                let condition = self.expression()?;
                let primary = Box::new(self.statement()?);
                let alternative = if header.children == 3 {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                Ok(Stmt::If { condition, primary, alternative, location: header.location })
            }
            "For" => {
                header.expect_payload("for")?;
                header.expect_children(4)?;
                let pre = Box::new(self.statement()?);
                let condition = self.expression()?;
                let post = Box::new(self.statement()?);
                let body = Box::new(self.statement()?);
                Ok(Stmt::For { pre, condition, post, body, location: header.location })
            }
            "Assignment" => {
                header.expect_payload("=")?;
                header.expect_children(2)?;
                let place = self.expression()?;
                let value = self.expression()?;
                Ok(Stmt::Assignment { place, value, location: header.location })
            }
            "Scope" => {
                header.expect_payload("{")?;
                let statements = (0..header.children)
                    .map(|_| self.statement())
                    .collect::<Result<Vec<_>>>()?;
                Ok(Stmt::Scope { statements, location: header.location })
            }
            _ => Ok(Stmt::Expr(self.expression_from(header)?)),
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        let header = self.next_header()?;
        self.enter(&header)?;
        let result = self.expression_from(header);
        self.leave();
        result
    }

    fn expression_from(&mut self, header: Header<'a>) -> Result<Expr> {
        match header.kind {
            "IntLiteral" => {
                header.expect_children(0)?;
                let field = header.payload()?;
                let value = field
                    .parse()
                    .map_err(|_| header.error(format!("invalid integer {:?}", field)))?;
                Ok(Expr::IntLiteral { value, location: header.location })
            }
            "FloatLiteral" => {
                header.expect_children(0)?;
                let field = header.payload()?;
                let value = field
                    .parse()
                    .map_err(|_| header.error(format!("invalid float {:?}", field)))?;
                Ok(Expr::FloatLiteral { value, location: header.location })
            }
            "StringLiteral" => {
                header.expect_children(0)?;
                let value = header.text()?;
                Ok(Expr::StringLiteral { value, location: header.location })
            }
            "BoolLiteral" => {
                header.expect_children(0)?;
                let value = match header.payload()? {
                    "true" => true,
                    "false" => false,
                    other => return Err(header.error(format!("invalid bool {:?}", other))),
                };
                Ok(Expr::BoolLiteral { value, location: header.location })
            }
            "Identifier" => {
                header.expect_children(0)?;
                let name = header.text()?;
                Ok(Expr::Identifier { name, location: header.location })
            }
            "Call" => {
                header.expect_payload("(")?;
                if header.children == 0 {
                    return Err(header.error("a call needs at least the callee"));
                }
                let function = Box::new(self.expression()?);
                let arguments = (1..header.children)
                    .map(|_| self.expression())
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::Call { function, arguments, location: header.location })
            }
            "Index" => {
                header.expect_payload("[")?;
                header.expect_children(2)?;
                let structure = Box::new(self.expression()?);
                let index = Box::new(self.expression()?);
                Ok(Expr::Index { structure, index, location: header.location })
            }
            "Operator" => {
                header.expect_children(2)?;
                let op = header.text()?;
                let left = Box::new(self.expression()?);
                let right = Box::new(self.expression()?);
                Ok(Expr::Operator { op, left, right, location: header.location })
            }
            "UnaryOperator" => {
                header.expect_children(1)?;
                let op = header.text()?;
                let operand = Box::new(self.expression()?);
                Ok(Expr::UnaryOperator { op, operand, location: header.location })
            }
            "Void" => {
                header.expect_children(0)?;
                if !header.payload.is_empty() {
                    return Err(header.error("Void carries no payload"));
                }
                Ok(Expr::Void { location: header.location })
            }
            other => Err(header.error(format!("unknown node kind {:?}", other))),
        }
    }
}
