//! Frontend module - Tokenizer and Parser

pub mod token;
pub mod automaton;
pub mod lexer;
pub mod ast;
pub mod parser;
