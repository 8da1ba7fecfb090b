use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ir::Op;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Plain,
}

impl JoinKind {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Plain => "JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCondition {
    pub left: String,
    pub op: Op,
    pub right: String,
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// A joined table. Without a condition it is a cross join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub table: String,
    pub condition: Option<JoinCondition>,
}

impl JoinSpec {
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self { kind, table: table.into(), condition: None }
    }

    pub fn on(mut self, left: impl Into<String>, op: Op, right: impl Into<String>) -> Self {
        self.condition = Some(JoinCondition { left: left.into(), op, right: right.into() });
        self
    }

    pub fn is_cross(&self) -> bool {
        self.condition.is_none()
    }
}
