//! Tree Printer - Pretty print Tally syntax trees
//!
//! Outputs an indented ASCII tree for debugging (`tallyc parse --tree`).

use crate::frontend::ast::*;

/// Pretty printer for statement trees
pub struct TreePrinter {
    output: String,
}

impl TreePrinter {
    pub fn new() -> Self {
        Self { output: String::new() }
    }

    /// Print a statement tree to string
    pub fn print_statement(&mut self, stmt: &Stmt) -> String {
        self.output.clear();
        self.statement(stmt, "", true);
        std::mem::take(&mut self.output)
    }

    /// Write the branch marker and label, returning the indent for children
    fn node(&mut self, indent: &str, last: bool, label: &str) -> String {
        self.output.push_str(indent);
        self.output.push_str(if last { "\\-" } else { "|-" });
        self.output.push_str(label);
        self.output.push('\n');
        format!("{}{}", indent, if last { "  " } else { "| " })
    }

    fn statement(&mut self, stmt: &Stmt, indent: &str, last: bool) {
        match stmt {
            Stmt::If { condition, primary, alternative, .. } => {
                let indent = self.node(indent, last, "If");
                self.expression(condition, &indent, false);
                match alternative {
                    Some(alternative) => {
                        self.statement(primary, &indent, false);
                        self.statement(alternative, &indent, true);
                    }
                    None => self.statement(primary, &indent, true),
                }
            }
            Stmt::For { pre, condition, post, body, .. } => {
                let indent = self.node(indent, last, "For");
                self.statement(pre, &indent, false);
                self.expression(condition, &indent, false);
                self.statement(post, &indent, false);
                self.statement(body, &indent, true);
            }
            Stmt::Assignment { place, value, .. } => {
                let indent = self.node(indent, last, "=");
                self.expression(place, &indent, false);
                self.expression(value, &indent, true);
            }
            Stmt::Scope { statements, .. } => {
                let indent = self.node(indent, last, "Scope");
                let count = statements.len();
                for (i, statement) in statements.iter().enumerate() {
                    self.statement(statement, &indent, i + 1 == count);
                }
            }
            Stmt::Expr(expr) => self.expression(expr, indent, last),
        }
    }

    fn expression(&mut self, expr: &Expr, indent: &str, last: bool) {
        match expr {
            Expr::IntLiteral { value, .. } => {
                self.node(indent, last, &value.to_string());
            }
            Expr::FloatLiteral { value, .. } => {
                self.node(indent, last, &value.to_string());
            }
            Expr::StringLiteral { value, .. } => {
                self.node(indent, last, &format!("{:?}", value));
            }
            Expr::BoolLiteral { value, .. } => {
                self.node(indent, last, &value.to_string());
            }
            Expr::Identifier { name, .. } => {
                self.node(indent, last, name);
            }
            Expr::Call { function, arguments, .. } => {
                let indent = self.node(indent, last, "Call");
                self.expression(function, &indent, arguments.is_empty());
                let count = arguments.len();
                for (i, argument) in arguments.iter().enumerate() {
                    self.expression(argument, &indent, i + 1 == count);
                }
            }
            Expr::Index { structure, index, .. } => {
                let indent = self.node(indent, last, "Index");
                self.expression(structure, &indent, false);
                self.expression(index, &indent, true);
            }
            Expr::Operator { op, left, right, .. } => {
                let indent = self.node(indent, last, op);
                self.expression(left, &indent, false);
                self.expression(right, &indent, true);
            }
            Expr::UnaryOperator { op, operand, .. } => {
                let indent = self.node(indent, last, op);
                self.expression(operand, &indent, true);
            }
            Expr::Void { .. } => {
                self.node(indent, last, "void");
            }
        }
    }
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to print a statement tree
pub fn print_tree(stmt: &Stmt) -> String {
    TreePrinter::new().print_statement(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;
    use crate::frontend::parser::parse;
    use crate::utils::Limits;
    use pretty_assertions::assert_eq;

    fn tree(source: &str) -> String {
        let stmt = parse(tokenize(source, "test").unwrap(), Limits::default()).unwrap();
        print_tree(&stmt)
    }

    #[test]
    fn test_print_operator() {
        assert_eq!(tree("1 + 2 * 3"), "\\-+\n  |-1\n  \\-*\n    |-2\n    \\-3\n");
    }

    #[test]
    fn test_print_if_else() {
        assert_eq!(
            tree("if x == 1 { println(\"a\") } else { }"),
            "\\-If\n\
             \x20 |-==\n\
             \x20 | |-x\n\
             \x20 | \\-1\n\
             \x20 |-Scope\n\
             \x20 | \\-Call\n\
             \x20 |   |-println\n\
             \x20 |   \\-\"a\"\n\
             \x20 \\-Scope\n"
        );
    }

    #[test]
    fn test_print_assignment() {
        assert_eq!(tree("var s = -2.5"), "\\-=\n  |-s\n  \\--\n    \\-2.5\n");
    }
}
