//! Structured Feedback Module
//!
//! Machine-readable error output (`--error-format json`).

use serde::Serialize;

use crate::utils::{Error, Location};

/// A structured error report
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Error kind, e.g. "ParseError" or "UndeclaredVariable"
    pub kind: &'static str,

    /// Human-readable message
    pub message: String,

    /// Where the error was raised, when known
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a diagnostic from a toolchain error
    pub fn from_error(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            location: error.location().cloned(),
        }
    }

    /// Diagnostic for failures outside the toolchain proper, such as an
    /// unreadable input file
    pub fn other(message: String) -> Self {
        Self { kind: "IoError", message, location: None }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_json() {
        let error = Error::UndeclaredVariable {
            name: "x".to_string(),
            location: Location::new("main.tl", 3, 9),
        };
        let json: serde_json::Value = serde_json::from_str(&Diagnostic::from_error(&error).to_json()).unwrap();

        assert_eq!(json["kind"], "UndeclaredVariable");
        assert_eq!(json["location"]["file"], "main.tl");
        assert_eq!(json["location"]["line"], 3);
        assert_eq!(json["location"]["column"], 9);
        assert!(json["message"].as_str().unwrap().contains("\"x\""));
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diagnostic = Diagnostic::from_error(&Error::decode(4, "unknown node kind"));
        assert_eq!(diagnostic.kind, "DecodeError");
        assert!(diagnostic.to_json().contains("\"location\":null"));
    }
}
