use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ir::{AggKind, Condition, Expr, JoinSpec, OrderBy, SelectExpr};

/// Clause-structured form of one request, shared by both renderers.
///
/// Built once per translation by the clause parser, then handed to the
/// normalizer; renderers only ever see the normalized value.
#[derive(Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIr {
    pub select: Vec<SelectExpr>,
    pub source: Option<String>,
    pub joins: Vec<JoinSpec>,
    /// Applied before grouping (WHERE). Never holds aggregated conditions.
    pub filters: Vec<Condition>,
    pub group_by: Vec<String>,
    /// Applied after grouping (HAVING). Only aggregated conditions.
    pub post_filters: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl QueryIr {
    /// Route a condition to `filters` or `post_filters` by its target.
    pub fn push_condition(&mut self, condition: Condition) {
        if condition.is_aggregated() {
            self.post_filters.push(condition);
        } else {
            self.filters.push(condition);
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }

    pub fn selects(&self, expr: &Expr) -> bool {
        self.select.iter().any(|s| &s.expr == expr)
    }

    pub fn selects_column(&self, column: &str) -> bool {
        self.select.iter().any(|s| matches!(&s.expr, Expr::Column(name) if name == column))
    }

    /// Most recently selected plain column.
    pub fn last_select_column(&self) -> Option<&str> {
        self.select.iter().rev().find_map(|s| match &s.expr {
            Expr::Column(name) => Some(name.as_str()),
            Expr::Aggregate { .. } => None,
        })
    }

    /// First selected aggregate of the given kind.
    pub fn select_aggregate(&self, func: AggKind) -> Option<&Expr> {
        self.select
            .iter()
            .map(|s| &s.expr)
            .find(|e| e.aggregate_kind() == Some(func))
    }

    pub fn has_aggregates(&self) -> bool {
        self.select.iter().any(|s| s.expr.is_aggregate()) || !self.post_filters.is_empty()
    }

    /// A grouping step is needed for explicit keys or any aggregate.
    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty() || self.has_aggregates()
    }
}

impl fmt::Display for QueryIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |items: Vec<String>| items.join(", ");
        let select = join(self.select.iter().map(|s| s.to_string()).collect());
        let joins = join(self.joins.iter().map(|j| format!("{:?}", j)).collect());
        let filters = join(self.filters.iter().map(|c| c.to_string()).collect());
        let post_filters = join(self.post_filters.iter().map(|c| c.to_string()).collect());
        let order = join(self.order_by.iter().map(|o| o.to_string()).collect());

        write!(f, "QueryIr(select=[{}], source={:?}, joins=[{}], filters=[{}], group_by=[{}], post_filters=[{}], order_by=[{}], limit={:?}, offset={:?})",
               select, self.source, joins, filters, self.group_by.join(", "), post_filters, order, self.limit, self.offset)
    }
}

impl fmt::Debug for QueryIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{AggKind, Condition, Expr, Number, Op, QueryIr, SelectExpr, Value};

    #[test]
    pub fn test_push_condition_routes_by_target() {
        let mut ir = QueryIr::default();
        ir.push_condition(Condition::new(Expr::column("age"), Op::Gt, Value::Number(Number::Int(30))));
        ir.push_condition(Condition::new(
            Expr::aggregate(AggKind::Count, "id"),
            Op::Gt,
            Value::Number(Number::Int(10)),
        ));

        assert_eq!(ir.filters.len(), 1);
        assert_eq!(ir.post_filters.len(), 1);
        assert!(!ir.filters[0].is_aggregated());
        assert!(ir.post_filters[0].is_aggregated());
    }

    #[test]
    pub fn test_last_select_column_skips_aggregates() {
        let mut ir = QueryIr::default();
        ir.select.push(SelectExpr::column("instructorName"));
        ir.select.push(SelectExpr::aggregate(AggKind::Sum, "hours"));

        assert_eq!(ir.last_select_column(), Some("instructorName"));
        assert!(ir.is_grouped());
    }

    #[test]
    pub fn test_plain_query_is_not_grouped() {
        let mut ir = QueryIr::default();
        ir.select.push(SelectExpr::column("name"));
        assert!(!ir.is_grouped());
        assert_eq!(ir.source_name(), "");
    }
}
