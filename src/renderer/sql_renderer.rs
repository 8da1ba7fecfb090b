use crate::{
    ir::{Condition, JoinSpec, QueryIr},
    renderer::Renderer,
};

/// Renders SQL text, clauses in the fixed order
/// SELECT, FROM, JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT, OFFSET.
/// Empty clauses are left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlRenderer;

impl SqlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn join_clause(join: &JoinSpec) -> String {
        match &join.condition {
            Some(condition) => format!("{} {} ON {}", join.kind.sql_keyword(), join.table, condition),
            None => format!("CROSS JOIN {}", join.table),
        }
    }

    fn predicate(conditions: &[Condition]) -> String {
        conditions.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" AND ")
    }
}

impl Renderer for SqlRenderer {
    type Output = String;

    fn render(&self, ir: &QueryIr) -> String {
        let mut parts: Vec<String> = vec![];

        if ir.select.is_empty() {
            parts.push("SELECT *".to_string());
        } else {
            let select: Vec<String> = ir.select.iter().map(|s| s.to_string()).collect();
            parts.push(format!("SELECT {}", select.join(", ")));
        }

        if let Some(source) = &ir.source {
            parts.push(format!("FROM {}", source));
        }

        parts.extend(ir.joins.iter().map(Self::join_clause));

        if !ir.filters.is_empty() {
            parts.push(format!("WHERE {}", Self::predicate(&ir.filters)));
        }

        if !ir.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", ir.group_by.join(", ")));
        }

        if !ir.post_filters.is_empty() {
            parts.push(format!("HAVING {}", Self::predicate(&ir.post_filters)));
        }

        if !ir.order_by.is_empty() {
            let order: Vec<String> = ir.order_by.iter().map(|o| o.to_string()).collect();
            parts.push(format!("ORDER BY {}", order.join(", ")));
        }

        if let Some(limit) = ir.limit {
            parts.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = ir.offset {
            parts.push(format!("OFFSET {}", offset));
        }

        parts.join(" ")
    }
}
