//! Tree-walking evaluator
//!
//! Statements run for effect; expressions reduce to literal nodes, which
//! double as runtime values. Every error is fatal and propagates to the
//! caller, and scopes are popped on the way out whether or not the block
//! finished normally.

use std::io::Write;

use log::debug;

use crate::frontend::ast::*;
use crate::interpreter::builtins::Builtin;
use crate::interpreter::scope::ScopeStack;
use crate::utils::{Error, Limits, Location, Result};

/// The interpreter state
pub struct Interpreter<W: Write> {
    scopes: ScopeStack,
    /// Where `println` writes
    out: W,
    depth: usize,
    limits: Limits,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self {
            scopes: ScopeStack::new(),
            out,
            depth: 0,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Give back the output sink
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute a whole program
    pub fn run(&mut self, stmt: &Stmt) -> Result<()> {
        debug!("interpreting program at {}", stmt.location());
        self.execute(stmt)?;
        self.out.flush()?;
        Ok(())
    }

    fn enter(&mut self, location: &Location) -> Result<()> {
        if self.depth >= self.limits.max_depth {
            return Err(Error::RecursionTooDeep {
                limit: self.limits.max_depth,
                location: location.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Run `body` inside a fresh scope
    fn scoped<T>(&mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push();
        let result = body(self);
        self.scopes.pop();
        result
    }

    // ==================== Statements ====================

    fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        self.enter(stmt.location())?;
        let result = self.execute_inner(stmt);
        self.leave();
        result
    }

    fn execute_inner(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::If { condition, primary, alternative, .. } => self.scoped(|this| {
                if this.condition(condition, "if condition")? {
                    this.execute(primary)
                } else if let Some(alternative) = alternative {
                    this.execute(alternative)
                } else {
                    Ok(())
                }
            }),
            Stmt::For { pre, condition, post, body, .. } => self.scoped(|this| {
                this.execute(pre)?;
                while this.condition(condition, "for condition")? {
                    this.execute(body)?;
                    this.execute(post)?;
                }
                Ok(())
            }),
            Stmt::Assignment { place, value, .. } => {
                let Expr::Identifier { name, .. } = place else {
                    return Err(Error::InvalidAssignmentTarget {
                        location: place.location().clone(),
                    });
                };
                let value = self.evaluate(value)?;
                self.scopes.assign(name, value);
                Ok(())
            }
            Stmt::Scope { statements, .. } => self.scoped(|this| {
                statements.iter().try_for_each(|statement| this.execute(statement))
            }),
            Stmt::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
        }
    }

    /// Evaluate a loop or branch condition, which must be a Bool
    fn condition(&mut self, expr: &Expr, context: &str) -> Result<bool> {
        match self.evaluate(expr)? {
            Expr::BoolLiteral { value, .. } => Ok(value),
            other => Err(Error::TypeMismatch {
                context: context.to_string(),
                found: other.type_name().to_string(),
                location: expr.location().clone(),
            }),
        }
    }

    // ==================== Expressions ====================

    /// Reduce an expression to a literal (or `Void`)
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Expr> {
        self.enter(expr.location())?;
        let result = self.evaluate_inner(expr);
        self.leave();
        result
    }

    fn evaluate_inner(&mut self, expr: &Expr) -> Result<Expr> {
        match expr {
            Expr::IntLiteral { .. }
            | Expr::FloatLiteral { .. }
            | Expr::StringLiteral { .. }
            | Expr::BoolLiteral { .. }
            | Expr::Void { .. } => Ok(expr.clone()),
            Expr::Identifier { name, location } => {
                self.scopes
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| Error::UndeclaredVariable {
                        name: name.clone(),
                        location: location.clone(),
                    })
            }
            Expr::Call { function, arguments, location } => self.call(function, arguments, location),
            Expr::Index { location, .. } => Err(Error::UnimplementedFeature {
                feature: "indexing".to_string(),
                location: location.clone(),
            }),
            Expr::Operator { op, left, right, location } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(op, left, right, location)
            }
            Expr::UnaryOperator { op, operand, location } => {
                let operand = self.evaluate(operand)?;
                unary(op, operand, location)
            }
        }
    }

    fn call(&mut self, function: &Expr, arguments: &[Expr], location: &Location) -> Result<Expr> {
        let Expr::Identifier { name, .. } = function else {
            return Err(Error::NotCallable { location: function.location().clone() });
        };
        let Some(builtin) = Builtin::from_name(name) else {
            return Err(Error::UnimplementedFeature {
                feature: format!("call to user function {:?}", name),
                location: location.clone(),
            });
        };
        if arguments.len() != builtin.arity() {
            return Err(Error::ArityMismatch {
                callee: name.clone(),
                expected: builtin.arity(),
                actual: arguments.len(),
                location: location.clone(),
            });
        }

        let arguments = arguments
            .iter()
            .map(|argument| self.evaluate(argument))
            .collect::<Result<Vec<_>>>()?;
        builtin.call(arguments, &mut self.out, location)
    }
}

// ==================== Operators ====================

fn undefined(op: &str, operand: &Expr, location: &Location) -> Error {
    Error::UndefinedOperator {
        op: op.to_string(),
        operand: operand.type_name().to_string(),
        location: location.clone(),
    }
}

/// Apply a binary operator to two values of the same kind
fn binary(op: &str, left: Expr, right: Expr, location: &Location) -> Result<Expr> {
    let location = location.clone();
    let value = match (&left, &right) {
        (Expr::IntLiteral { value: l, .. }, Expr::IntLiteral { value: r, .. }) => {
            let (l, r) = (*l, *r);
            match op {
                "+" => Expr::IntLiteral { value: l.wrapping_add(r), location },
                "-" => Expr::IntLiteral { value: l.wrapping_sub(r), location },
                "*" => Expr::IntLiteral { value: l.wrapping_mul(r), location },
                "/" if r == 0 => return Err(Error::DivisionByZero { location }),
                "/" => Expr::IntLiteral { value: l.wrapping_div(r), location },
                "<" => Expr::BoolLiteral { value: l < r, location },
                ">" => Expr::BoolLiteral { value: l > r, location },
                "==" => Expr::BoolLiteral { value: l == r, location },
                _ => return Err(undefined(op, &left, &location)),
            }
        }
        (Expr::FloatLiteral { value: l, .. }, Expr::FloatLiteral { value: r, .. }) => {
            let (l, r) = (*l, *r);
            match op {
                "+" => Expr::FloatLiteral { value: l + r, location },
                "-" => Expr::FloatLiteral { value: l - r, location },
                "*" => Expr::FloatLiteral { value: l * r, location },
                "/" => Expr::FloatLiteral { value: l / r, location },
                "<" => Expr::BoolLiteral { value: l < r, location },
                ">" => Expr::BoolLiteral { value: l > r, location },
                "==" => Expr::BoolLiteral { value: l == r, location },
                _ => return Err(undefined(op, &left, &location)),
            }
        }
        (Expr::StringLiteral { value: l, .. }, Expr::StringLiteral { value: r, .. }) => match op {
            "+" => Expr::StringLiteral { value: format!("{}{}", l, r), location },
            "==" => Expr::BoolLiteral { value: l == r, location },
            _ => return Err(undefined(op, &left, &location)),
        },
        (Expr::BoolLiteral { value: l, .. }, Expr::BoolLiteral { value: r, .. }) => match op {
            "==" => Expr::BoolLiteral { value: l == r, location },
            _ => return Err(undefined(op, &left, &location)),
        },
        _ if left.type_name() == right.type_name() => return Err(undefined(op, &left, &location)),
        _ => {
            return Err(Error::TypeMismatch {
                context: format!("operator {:?}", op),
                found: format!("{} and {}", left.type_name(), right.type_name()),
                location,
            })
        }
    };
    Ok(value)
}

/// Apply a unary operator; only numeric negation is defined
fn unary(op: &str, operand: Expr, location: &Location) -> Result<Expr> {
    let location = location.clone();
    match (op, &operand) {
        ("-", Expr::IntLiteral { value, .. }) => Ok(Expr::IntLiteral { value: value.wrapping_neg(), location }),
        ("-", Expr::FloatLiteral { value, .. }) => Ok(Expr::FloatLiteral { value: -value, location }),
        _ => Err(undefined(op, &operand, &location)),
    }
}
