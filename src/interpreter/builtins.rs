//! Built-in Functions Registry
//!
//! Defines all built-in functions available in Tally. Anything else that is
//! called by name is a user function, which the interpreter does not run.

use std::io::Write;

use log::trace;

use crate::frontend::ast::Expr;
use crate::utils::{Error, Location, Result};

/// A built-in function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `println(s: String) -> Void`
    Println,
    /// `string(x: Int | Float | String) -> String`
    String,
}

impl Builtin {
    /// Get a built-in function by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "println" => Some(Builtin::Println),
            "string" => Some(Builtin::String),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Println => "println",
            Builtin::String => "string",
        }
    }

    /// Number of arguments the function takes
    pub fn arity(self) -> usize {
        match self {
            Builtin::Println | Builtin::String => 1,
        }
    }

    /// Run the function on already evaluated arguments. The result is
    /// located at the call site.
    pub fn call<W: Write>(self, arguments: Vec<Expr>, out: &mut W, location: &Location) -> Result<Expr> {
        let [argument]: [Expr; 1] = arguments.try_into().map_err(|arguments: Vec<Expr>| {
            Error::ArityMismatch {
                callee: self.name().to_string(),
                expected: self.arity(),
                actual: arguments.len(),
                location: location.clone(),
            }
        })?;
        trace!("call {}({})", self.name(), argument.type_name());

        match (self, argument) {
            (Builtin::Println, Expr::StringLiteral { value, .. }) => {
                writeln!(out, "{}", value)?;
                Ok(Expr::Void { location: location.clone() })
            }
            (Builtin::String, Expr::IntLiteral { value, .. }) => Ok(Expr::StringLiteral {
                value: value.to_string(),
                location: location.clone(),
            }),
            (Builtin::String, Expr::FloatLiteral { value, .. }) => Ok(Expr::StringLiteral {
                value: format_float_exponent(value),
                location: location.clone(),
            }),
            (Builtin::String, Expr::StringLiteral { value, .. }) => Ok(Expr::StringLiteral {
                value,
                location: location.clone(),
            }),
            (builtin, other) => Err(Error::TypeMismatch {
                context: format!("argument of {}", builtin.name()),
                found: other.type_name().to_string(),
                location: location.clone(),
            }),
        }
    }
}

/// Exponential notation with the shortest mantissa that survives a round
/// trip through `f32`, and a signed exponent of at least two digits:
/// `1.5E+00`, `-2.5E-01`, `1E+10`.
pub fn format_float_exponent(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "+Inf" } else { "-Inf" };
        return text.to_string();
    }

    let formatted = format!("{:E}", value);
    let Some((mantissa, exponent)) = formatted.split_once('E') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}E{}{:02}", mantissa, sign, exponent.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::new("test", 1, 1)
    }

    fn string(value: &str) -> Expr {
        Expr::StringLiteral { value: value.to_string(), location: loc() }
    }

    #[test]
    fn test_registry() {
        assert_eq!(Builtin::from_name("println"), Some(Builtin::Println));
        assert_eq!(Builtin::from_name("string"), Some(Builtin::String));
        assert_eq!(Builtin::from_name("print"), None);
    }

    #[test]
    fn test_format_float_exponent() {
        assert_eq!(format_float_exponent(1.5), "1.5E+00");
        assert_eq!(format_float_exponent(-0.25), "-2.5E-01");
        assert_eq!(format_float_exponent(1e10), "1E+10");
        assert_eq!(format_float_exponent(0.1), "1E-01");
        assert_eq!(format_float_exponent(123456.0), "1.23456E+05");
        assert_eq!(format_float_exponent(f32::INFINITY), "+Inf");
        assert_eq!(format_float_exponent(f32::NEG_INFINITY), "-Inf");
        assert_eq!(format_float_exponent(f32::NAN), "NaN");
    }

    #[test]
    fn test_println_writes_line() {
        let mut out = Vec::new();
        let result = Builtin::Println.call(vec![string("hi")], &mut out, &loc()).unwrap();
        assert!(matches!(result, Expr::Void { .. }));
        assert_eq!(String::from_utf8(out).unwrap(), "hi\n");
    }

    #[test]
    fn test_println_needs_string() {
        let mut out = Vec::new();
        let arg = Expr::IntLiteral { value: 1, location: loc() };
        let err = Builtin::Println.call(vec![arg], &mut out, &loc()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref found, .. } if found == "Int"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_string_conversions() {
        let mut out = Vec::new();
        let int = Expr::IntLiteral { value: -12, location: loc() };
        assert_eq!(Builtin::String.call(vec![int], &mut out, &loc()).unwrap(), string("-12"));
        assert_eq!(Builtin::String.call(vec![string("x")], &mut out, &loc()).unwrap(), string("x"));

        let boolean = Expr::BoolLiteral { value: true, location: loc() };
        let err = Builtin::String.call(vec![boolean], &mut out, &loc()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_arity() {
        let mut out = Vec::new();
        let err = Builtin::String.call(vec![string("a"), string("b")], &mut out, &loc()).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { expected: 1, actual: 2, .. }));
    }
}
