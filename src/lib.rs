pub mod parser;

pub mod ir;
pub use ir::{Expr, QueryIr, SelectExpr};

pub mod renderer;
pub use renderer::{DocumentQuery, QueryArtifact, Target};

pub mod translator;
pub use translator::{ActiveSource, SharedActiveSource, TranslateError, Translator, TranslatorConfig};
