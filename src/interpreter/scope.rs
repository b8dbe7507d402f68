//! Scope stack for the interpreter
//!
//! Frames are searched from the global (outermost) frame inwards and the
//! first binding found wins, for both lookup and assignment. A name that is
//! bound in an outer frame therefore hides any inner binding of the same name.

use std::collections::HashMap;

use log::trace;

use crate::frontend::ast::Expr;

/// A single frame: name to literal value
type Frame = HashMap<String, Expr>;

/// Stack of lexical scopes with a global frame at the bottom
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        // Create global scope
        Self { frames: vec![Frame::new()] }
    }

    /// Enter a new scope
    pub fn push(&mut self) {
        self.frames.push(Frame::new());
        trace!("enter scope, depth {}", self.frames.len());
    }

    /// Exit the current scope, dropping its bindings. The global frame stays.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        trace!("exit scope, depth {}", self.frames.len());
    }

    /// Number of live frames, the global one included
    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Look up a name, outermost frame first
    pub fn lookup(&self, name: &str) -> Option<&Expr> {
        self.frames.iter().find_map(|frame| frame.get(name))
    }

    /// Overwrite the first existing binding of `name`, or bind it in the
    /// innermost frame when no frame has it.
    pub fn assign(&mut self, name: &str, value: Expr) {
        if let Some(slot) = self.frames.iter_mut().find_map(|frame| frame.get_mut(name)) {
            *slot = value;
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Location;

    fn int(value: i64) -> Expr {
        Expr::IntLiteral { value, location: Location::start_of("test") }
    }

    #[test]
    fn test_assign_binds_in_innermost_frame() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.assign("y", int(1));
        assert_eq!(scopes.lookup("y"), Some(&int(1)));

        scopes.pop();
        assert_eq!(scopes.lookup("y"), None);
    }

    #[test]
    fn test_assign_overwrites_outer_binding() {
        let mut scopes = ScopeStack::new();
        scopes.assign("x", int(1));
        scopes.push();
        scopes.assign("x", int(2));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(&int(2)));
    }

    #[test]
    fn test_outer_binding_hides_inner() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.frames[1].insert("x".to_string(), int(2));
        scopes.frames[0].insert("x".to_string(), int(1));

        assert_eq!(scopes.lookup("x"), Some(&int(1)));
        scopes.assign("x", int(3));
        assert_eq!(scopes.frames[0].get("x"), Some(&int(3)));
        assert_eq!(scopes.frames[1].get("x"), Some(&int(2)));
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut scopes = ScopeStack::new();
        scopes.pop();
        scopes.pop();
        assert_eq!(scopes.depth(), 1);
        scopes.assign("g", int(7));
        assert_eq!(scopes.lookup("g"), Some(&int(7)));
    }
}
