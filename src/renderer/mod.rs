pub mod renderer;
pub use renderer::*;

pub mod document_query;
pub use document_query::*;

pub mod sql_renderer;
pub use sql_renderer::*;

pub mod pipeline_renderer;
pub use pipeline_renderer::*;
