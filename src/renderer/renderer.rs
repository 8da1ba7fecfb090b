use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ir::QueryIr, renderer::DocumentQuery};

/// A pure function of a normalized IR.
pub trait Renderer {
    type Output;

    fn render(&self, ir: &QueryIr) -> Self::Output;
}

/// Which kind of store the query is rendered for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Relational table, SQL text.
    #[default]
    Sql,
    /// Document collection, aggregation pipeline.
    Document,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Sql => f.write_str("sql"),
            Target::Document => f.write_str("document"),
        }
    }
}

/// Output of one translation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArtifact {
    Sql(String),
    Pipeline(DocumentQuery),
}

impl QueryArtifact {
    pub fn target(&self) -> Target {
        match self {
            QueryArtifact::Sql(_) => Target::Sql,
            QueryArtifact::Pipeline(_) => Target::Document,
        }
    }

    pub fn as_sql(&self) -> Option<&str> {
        match self {
            QueryArtifact::Sql(sql) => Some(sql),
            QueryArtifact::Pipeline(_) => None,
        }
    }

    pub fn as_pipeline(&self) -> Option<&DocumentQuery> {
        match self {
            QueryArtifact::Sql(_) => None,
            QueryArtifact::Pipeline(query) => Some(query),
        }
    }
}

impl fmt::Display for QueryArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryArtifact::Sql(sql) => f.write_str(sql),
            QueryArtifact::Pipeline(query) => write!(f, "{}", query),
        }
    }
}
