//! Middle module - canonical AST encoding and tree printing

pub mod encoder;
pub mod decoder;
pub mod tree;

pub use decoder::decode_statement;
pub use encoder::encode_statement;
pub use tree::print_tree;
