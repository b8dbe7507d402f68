//! Abstract Syntax Tree definitions for Tally
//!
//! Literal expressions double as runtime values: the interpreter reduces
//! every expression to one of the literal variants (or `Void`).

use crate::utils::Location;

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    If {
        condition: Expr,
        primary: Box<Stmt>,
        alternative: Option<Box<Stmt>>,
        location: Location,
    },
    For {
        pre: Box<Stmt>,
        condition: Expr,
        post: Box<Stmt>,
        body: Box<Stmt>,
        location: Location,
    },
    Assignment {
        place: Expr,
        value: Expr,
        location: Location,
    },
    Scope {
        statements: Vec<Stmt>,
        location: Location,
    },
    Expr(Expr),
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLiteral { value: i64, location: Location },
    FloatLiteral { value: f32, location: Location },
    StringLiteral { value: String, location: Location },
    BoolLiteral { value: bool, location: Location },
    Identifier { name: String, location: Location },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
        location: Location,
    },
    Index {
        structure: Box<Expr>,
        index: Box<Expr>,
        location: Location,
    },
    Operator {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
        location: Location,
    },
    UnaryOperator {
        op: String,
        operand: Box<Expr>,
        location: Location,
    },
    /// No value; what `println` and friends evaluate to
    Void { location: Location },
}

impl Stmt {
    pub fn location(&self) -> &Location {
        match self {
            Stmt::If { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Assignment { location, .. }
            | Stmt::Scope { location, .. } => location,
            Stmt::Expr(expr) => expr.location(),
        }
    }
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::IntLiteral { location, .. }
            | Expr::FloatLiteral { location, .. }
            | Expr::StringLiteral { location, .. }
            | Expr::BoolLiteral { location, .. }
            | Expr::Identifier { location, .. }
            | Expr::Call { location, .. }
            | Expr::Index { location, .. }
            | Expr::Operator { location, .. }
            | Expr::UnaryOperator { location, .. }
            | Expr::Void { location } => location,
        }
    }

    /// Node kind name, as used by the canonical encoding
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::IntLiteral { .. } => "IntLiteral",
            Expr::FloatLiteral { .. } => "FloatLiteral",
            Expr::StringLiteral { .. } => "StringLiteral",
            Expr::BoolLiteral { .. } => "BoolLiteral",
            Expr::Identifier { .. } => "Identifier",
            Expr::Call { .. } => "Call",
            Expr::Index { .. } => "Index",
            Expr::Operator { .. } => "Operator",
            Expr::UnaryOperator { .. } => "UnaryOperator",
            Expr::Void { .. } => "Void",
        }
    }

    /// Short type name of a runtime value, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::IntLiteral { .. } => "Int",
            Expr::FloatLiteral { .. } => "Float",
            Expr::StringLiteral { .. } => "String",
            Expr::BoolLiteral { .. } => "Bool",
            Expr::Void { .. } => "Void",
            other => other.kind_name(),
        }
    }
}
