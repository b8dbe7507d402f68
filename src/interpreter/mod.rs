//! Interpreter module - scope stack, built-ins and the evaluator

pub mod builtins;
pub mod evaluator;
pub mod scope;

pub use evaluator::Interpreter;
