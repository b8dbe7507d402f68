//! Source location tracking

use serde::Serialize;
use std::fmt;

/// Stand-in for spaces inside file names on the wire (U+200B ZERO WIDTH SPACE).
const FILE_SPACE: char = '\u{200B}';

/// A position in a source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Create a new location
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self { file: file.into(), line, column }
    }

    /// The first position of a file
    pub fn start_of(file: impl Into<String>) -> Self {
        Self::new(file, 1, 1)
    }

    /// Wire form: `<file> <line> <column>`, spaces in the file name
    /// replaced by zero width spaces.
    pub fn encode(&self) -> String {
        let file: String = self
            .file
            .chars()
            .map(|c| if c == ' ' { FILE_SPACE } else { c })
            .collect();
        format!("{} {} {}", file, self.line, self.column)
    }

    /// Inverse of [`Location::encode`], given the three trailing fields of a line.
    pub fn decode(fields: &[&str]) -> std::result::Result<Self, String> {
        let [file, line, column] = fields else {
            return Err(format!("expected 3 location fields, got {}", fields.len()));
        };
        let line = line
            .parse()
            .map_err(|_| format!("invalid line number {:?}", line))?;
        let column = column
            .parse()
            .map_err(|_| format!("invalid column number {:?}", column))?;
        let file = file
            .chars()
            .map(|c| if c == FILE_SPACE { ' ' } else { c })
            .collect::<String>();
        Ok(Self { file, line, column })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
