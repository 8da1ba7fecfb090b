use serde::{Deserialize, Serialize};

use crate::ir::JoinKind;

/// Clause register of the clause parser.
///
/// There is no terminal state: parsing ends when the tokens run out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clause {
    #[default]
    Select,
    From,
    Join(JoinKind),
    On,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
}

impl Clause {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Join(kind) => kind.sql_keyword(),
            Clause::On => "ON",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
            Clause::Offset => "OFFSET",
        }
    }

    /// Clauses whose body is a row count.
    pub fn takes_count(&self) -> bool {
        matches!(self, Clause::Limit | Clause::Offset)
    }
}
