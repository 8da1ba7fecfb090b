pub mod clause;
pub use clause::*;

pub mod token;
pub use token::*;

pub mod lexicon;
pub use lexicon::*;

pub mod lexer;
pub use lexer::*;

pub mod clause_parser;
pub use clause_parser::*;
