//! Runtime limits shared by the parser and the interpreter

/// Default bound on statement/expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest recursion the parser or interpreter will enter before
    /// failing with `RecursionTooDeep`.
    pub max_depth: usize,
}

impl Limits {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}
