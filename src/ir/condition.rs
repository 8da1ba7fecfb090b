use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ir::{Expr, Value};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Op {
    /// Bare operator symbols accepted verbatim in the input.
    pub fn from_symbol(symbol: &str) -> Option<Op> {
        match symbol {
            "=" | "==" => Some(Op::Eq),
            "!=" | "<>" => Some(Op::NotEq),
            "<" => Some(Op::Lt),
            "<=" => Some(Op::LtEq),
            ">" => Some(Op::Gt),
            ">=" => Some(Op::GtEq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "!=",
            Op::Lt => "<",
            Op::LtEq => "<=",
            Op::Gt => ">",
            Op::GtEq => ">=",
        }
    }

    /// Aggregation-pipeline query operator.
    pub fn pipeline_operator(&self) -> &'static str {
        match self {
            Op::Eq => "$eq",
            Op::NotEq => "$ne",
            Op::Lt => "$lt",
            Op::LtEq => "$lte",
            Op::Gt => "$gt",
            Op::GtEq => "$gte",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Op({})", self)
    }
}

/// `target op value`. The condition is aggregated when its target is an
/// aggregate expression; such conditions belong after grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub target: Expr,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(target: Expr, op: Op, value: Value) -> Self {
        Self { target, op, value }
    }

    pub fn is_aggregated(&self) -> bool {
        self.target.is_aggregate()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.target, self.op, self.value.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{AggKind, Condition, Expr, Number, Op, Value};

    #[test]
    pub fn test_from_symbol() {
        assert_eq!(Op::from_symbol(">="), Some(Op::GtEq));
        assert_eq!(Op::from_symbol("<>"), Some(Op::NotEq));
        assert_eq!(Op::from_symbol("=>"), None);
    }

    #[test]
    pub fn test_condition_display() {
        let condition = Condition::new(Expr::column("department"), Op::Eq, Value::text("HR"));
        assert_eq!(condition.to_string(), "department = 'HR'");
        assert!(!condition.is_aggregated());

        let condition = Condition::new(
            Expr::aggregate(AggKind::Count, "courseName"),
            Op::Gt,
            Value::Number(Number::Int(1)),
        );
        assert_eq!(condition.to_string(), "COUNT(courseName) > 1");
        assert!(condition.is_aggregated());
    }
}
