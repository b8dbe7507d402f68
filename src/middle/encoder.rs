//! Canonical AST encoding
//!
//! Every node is a header line
//! `<Kind> <payload...> <childCount> <file> <line> <column>`
//! followed by its children, each encoded the same way, in a fixed order.
//! Expression statements are written as their bare expression.

use crate::frontend::ast::*;
use crate::utils::wire::escape_field;
use crate::utils::Location;

/// Encode a statement tree; lines are joined with `\n`, no trailing newline
pub fn encode_statement(stmt: &Stmt) -> String {
    let mut encoder = Encoder::new();
    encoder.statement(stmt);
    encoder.finish()
}

struct Encoder {
    lines: Vec<String>,
}

impl Encoder {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }

    fn header(&mut self, kind: &str, payload: Option<&str>, children: usize, location: &Location) {
        let line = match payload {
            Some(payload) => format!("{} {} {} {}", kind, payload, children, location.encode()),
            None => format!("{} {} {}", kind, children, location.encode()),
        };
        self.lines.push(line);
    }

    fn statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::If { condition, primary, alternative, location } => {
                let children = if alternative.is_some() { 3 } else { 2 };
                self.header("If", Some("if"), children, location);
                self.expression(condition);
                self.statement(primary);
                if let Some(alternative) = alternative {
                    self.statement(alternative);
                }
            }
            Stmt::For { pre, condition, post, body, location } => {
                self.header("For", Some("for"), 4, location);
                self.statement(pre);
                self.expression(condition);
                self.statement(post);
                self.statement(body);
            }
            Stmt::Assignment { place, value, location } => {
                self.header("Assignment", Some("="), 2, location);
                self.expression(place);
                self.expression(value);
            }
            Stmt::Scope { statements, location } => {
                self.header("Scope", Some("{"), statements.len(), location);
                for statement in statements {
                    self.statement(statement);
                }
            }
            Stmt::Expr(expr) => self.expression(expr),
        }
    }

    fn expression(&mut self, expr: &Expr) {
        let kind = expr.kind_name();
        match expr {
            Expr::IntLiteral { value, location } => {
                self.header(kind, Some(&value.to_string()), 0, location);
            }
            Expr::FloatLiteral { value, location } => {
                self.header(kind, Some(&value.to_string()), 0, location);
            }
            Expr::StringLiteral { value, location } => {
                self.header(kind, Some(&escape_field(value)), 0, location);
            }
            Expr::BoolLiteral { value, location } => {
                self.header(kind, Some(&value.to_string()), 0, location);
            }
            Expr::Identifier { name, location } => {
                self.header(kind, Some(&escape_field(name)), 0, location);
            }
            Expr::Call { function, arguments, location } => {
                self.header(kind, Some("("), 1 + arguments.len(), location);
                self.expression(function);
                for argument in arguments {
                    self.expression(argument);
                }
            }
            Expr::Index { structure, index, location } => {
                self.header(kind, Some("["), 2, location);
                self.expression(structure);
                self.expression(index);
            }
            Expr::Operator { op, left, right, location } => {
                self.header(kind, Some(&escape_field(op)), 2, location);
                self.expression(left);
                self.expression(right);
            }
            Expr::UnaryOperator { op, operand, location } => {
                self.header(kind, Some(&escape_field(op)), 1, location);
                self.expression(operand);
            }
            Expr::Void { location } => self.header(kind, None, 0, location),
        }
    }
}
