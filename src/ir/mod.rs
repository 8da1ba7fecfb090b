pub mod value;
pub use value::*;

pub mod expr;
pub use expr::*;

pub mod condition;
pub use condition::*;

pub mod join_spec;
pub use join_spec::*;

pub mod query_ir;
pub use query_ir::*;

pub mod normalizer;
pub use normalizer::*;
