use indexmap::IndexSet;
use serde_json::{json, Map, Value};

use crate::{
    ir::{AggKind, Condition, Expr, JoinKind, JoinSpec, Op, QueryIr},
    renderer::{DocumentQuery, Renderer},
};

/// Renders an aggregation pipeline.
///
/// Stage order: `$lookup`/`$unwind` per join, `$match` on plain filters,
/// `$group`, `$match` on aggregated filters, `$project`, `$sort`, `$skip`,
/// `$limit`. Stages with nothing to do are left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineRenderer;

impl PipelineRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for PipelineRenderer {
    type Output = DocumentQuery;

    fn render(&self, ir: &QueryIr) -> DocumentQuery {
        let source = ir.source_name();
        let mut pipeline: Vec<Value> = vec![];

        for join in &ir.joins {
            pipeline.push(lookup_stage(source, join));
            pipeline.push(unwind_stage(join));
        }

        if !ir.filters.is_empty() {
            let conditions = ir.filters.iter().map(|c| (c.target.column_name().to_string(), c));
            pipeline.push(json!({ "$match": match_document(conditions) }));
        }

        let layout = ir.is_grouped().then(|| GroupLayout::build(ir));

        if let Some(layout) = &layout {
            pipeline.push(json!({ "$group": layout.group_document() }));

            if !ir.post_filters.is_empty() {
                let conditions = ir.post_filters.iter().map(|c| (layout.field_for(&c.target), c));
                pipeline.push(json!({ "$match": match_document(conditions) }));
            }
        } else if !ir.select.is_empty() {
            let mut project = Map::new();
            for select in &ir.select {
                let column = select.expr.column_name();
                match &select.alias {
                    Some(alias) => project.insert(alias.clone(), Value::String(format!("${}", column))),
                    None => project.insert(column.to_string(), json!(1)),
                };
            }
            // `$sort` runs after `$project` and needs its keys to survive it.
            for order in &ir.order_by {
                let column = order.expr.column_name();
                if !project.contains_key(column) {
                    project.insert(column.to_string(), json!(1));
                }
            }
            pipeline.push(json!({ "$project": project }));
        }

        if !ir.order_by.is_empty() {
            let mut sort = Map::new();
            for order in &ir.order_by {
                let field = match &layout {
                    Some(layout) => layout.field_for(&order.expr),
                    None => order.expr.column_name().to_string(),
                };
                sort.insert(field, json!(if order.descending { -1 } else { 1 }));
            }
            pipeline.push(json!({ "$sort": sort }));
        }

        if let Some(offset) = ir.offset {
            pipeline.push(json!({ "$skip": offset }));
        }

        if let Some(limit) = ir.limit {
            pipeline.push(json!({ "$limit": limit }));
        }

        DocumentQuery::new(source, pipeline)
    }
}

/// Output field names of the `$group` stage.
///
/// Aggregates take their alias or the aggregate's default name, suffixed
/// `_1`, `_2`... on collision. Aggregates only referenced by HAVING or
/// ORDER BY get a field of their own. Selected columns that are not keys
/// are carried through with `$first`.
#[derive(Debug, Clone, PartialEq)]
struct GroupLayout {
    keys: Vec<String>,
    aggregates: Vec<(Expr, String)>,
    carried: Vec<(String, String)>,
}

impl GroupLayout {
    fn build(ir: &QueryIr) -> Self {
        let keys = ir.group_by.clone();
        let mut used: IndexSet<String> = IndexSet::new();
        used.insert("_id".to_string());

        let mut aggregates: Vec<(Expr, String)> = vec![];
        for select in ir.select.iter().filter(|s| s.expr.is_aggregate()) {
            let base = match (&select.alias, select.expr.aggregate_kind()) {
                (Some(alias), _) => alias.clone(),
                (None, Some(func)) => func.default_output_name().to_string(),
                (None, None) => continue,
            };
            aggregates.push((select.expr.clone(), unique_name(&base, &mut used)));
        }

        let referenced = ir
            .post_filters
            .iter()
            .map(|c| &c.target)
            .chain(ir.order_by.iter().map(|o| &o.expr));
        for expr in referenced {
            let Some(func) = expr.aggregate_kind() else {
                continue;
            };
            if aggregates.iter().any(|(e, _)| e == expr) {
                continue;
            }
            aggregates.push((expr.clone(), unique_name(func.default_output_name(), &mut used)));
        }

        let mut carried: Vec<(String, String)> = vec![];
        for select in &ir.select {
            let Expr::Column(column) = &select.expr else {
                continue;
            };
            if keys.contains(column) {
                continue;
            }
            let base = select.alias.clone().unwrap_or_else(|| column.clone());
            carried.push((column.clone(), unique_name(&base, &mut used)));
        }

        Self { keys, aggregates, carried }
    }

    fn group_id(&self) -> Value {
        match self.keys.as_slice() {
            [] => Value::Null,
            [key] => Value::String(format!("${}", key)),
            keys => {
                let mut id = Map::new();
                for key in keys {
                    id.insert(key_field(key).to_string(), Value::String(format!("${}", key)));
                }
                Value::Object(id)
            }
        }
    }

    fn group_document(&self) -> Value {
        let mut group = Map::new();
        group.insert("_id".to_string(), self.group_id());

        for (expr, name) in &self.aggregates {
            if let Expr::Aggregate { func, column } = expr {
                group.insert(name.clone(), accumulator(*func, column));
            }
        }

        for (column, name) in &self.carried {
            group.insert(name.clone(), json!({ "$first": format!("${}", column) }));
        }

        Value::Object(group)
    }

    /// Field that holds `expr` after grouping.
    fn field_for(&self, expr: &Expr) -> String {
        match expr {
            Expr::Column(column) if self.keys.contains(column) => {
                if self.keys.len() == 1 {
                    "_id".to_string()
                } else {
                    format!("_id.{}", key_field(column))
                }
            }
            Expr::Column(column) => self
                .carried
                .iter()
                .find(|(c, _)| c == column)
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| column.clone()),
            Expr::Aggregate { func, .. } => self
                .aggregates
                .iter()
                .find(|(e, _)| e == expr)
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| func.default_output_name().to_string()),
        }
    }
}

fn unique_name(base: &str, used: &mut IndexSet<String>) -> String {
    let mut name = base.to_string();
    let mut k = 1usize;
    while used.contains(&name) {
        name = format!("{}_{}", base, k);
        k += 1;
    }
    used.insert(name.clone());
    name
}

/// Composite `_id` sub-field for a possibly qualified key column.
fn key_field(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

fn accumulator(func: AggKind, column: &str) -> Value {
    let field = format!("${}", column);
    match func {
        AggKind::Avg => json!({ "$avg": field }),
        AggKind::Sum => json!({ "$sum": field }),
        AggKind::Count => json!({ "$sum": 1 }),
        AggKind::Max => json!({ "$max": field }),
        AggKind::Min => json!({ "$min": field }),
        AggKind::Distinct => json!({ "$addToSet": field }),
    }
}

/// `$match` body. Equality is a bare value; a field constrained more than
/// once switches the whole document to `$and`.
fn match_document<'a>(conditions: impl Iterator<Item = (String, &'a Condition)>) -> Value {
    let predicates: Vec<(String, Value)> = conditions
        .map(|(field, c)| {
            let predicate = match c.op {
                Op::Eq => c.value.to_json(),
                op => json!({ op.pipeline_operator(): c.value.to_json() }),
            };
            (field, predicate)
        })
        .collect();

    let distinct: IndexSet<&str> = predicates.iter().map(|(f, _)| f.as_str()).collect();
    if distinct.len() == predicates.len() {
        let mut document = Map::new();
        for (field, predicate) in predicates {
            document.insert(field, predicate);
        }
        return Value::Object(document);
    }

    let clauses: Vec<Value> = predicates
        .into_iter()
        .map(|(field, predicate)| {
            let mut clause = Map::new();
            clause.insert(field, predicate);
            Value::Object(clause)
        })
        .collect();
    json!({ "$and": clauses })
}

/// Splits `table.column`; unqualified names have no table.
fn split_qualifier(operand: &str) -> (Option<&str>, &str) {
    match operand.split_once('.') {
        Some((table, column)) => (Some(table), column),
        None => (None, operand),
    }
}

/// `(local, foreign, local_is_left)` for a join condition. The operand
/// qualified with the joined table is the foreign one; qualifiers naming
/// the source or the joined table are dropped.
fn join_fields(source: &str, join: &JoinSpec, left: &str, right: &str) -> (String, String, bool) {
    let (left_table, _) = split_qualifier(left);
    let local_is_left = left_table != Some(join.table.as_str());
    let (local, foreign) = if local_is_left { (left, right) } else { (right, left) };

    let local = match split_qualifier(local) {
        (Some(table), column) if table == source => column,
        _ => local,
    };
    let foreign = match split_qualifier(foreign) {
        (Some(table), column) if table == join.table => column,
        _ => foreign,
    };

    (local.to_string(), foreign.to_string(), local_is_left)
}

fn lookup_stage(source: &str, join: &JoinSpec) -> Value {
    if join.kind == JoinKind::Right {
        tracing::warn!(table = %join.table, "RIGHT JOIN has no pipeline form; rendered as a left-anchored lookup");
    }

    let Some(condition) = &join.condition else {
        return json!({
            "$lookup": { "from": join.table, "pipeline": [], "as": join.table }
        });
    };

    let (local, foreign, local_is_left) = join_fields(source, join, &condition.left, &condition.right);

    if condition.op == Op::Eq {
        return json!({
            "$lookup": {
                "from": join.table,
                "localField": local,
                "foreignField": foreign,
                "as": join.table,
            }
        });
    }

    let local_var = "$$local".to_string();
    let foreign_ref = format!("${}", foreign);
    let operands = if local_is_left { [local_var, foreign_ref] } else { [foreign_ref, local_var] };

    json!({
        "$lookup": {
            "from": join.table,
            "let": { "local": format!("${}", local) },
            "pipeline": [
                { "$match": { "$expr": { condition.op.pipeline_operator(): operands } } }
            ],
            "as": join.table,
        }
    })
}

fn unwind_stage(join: &JoinSpec) -> Value {
    let path = format!("${}", join.table);
    match join.kind {
        JoinKind::Left => json!({
            "$unwind": { "path": path, "preserveNullAndEmptyArrays": true }
        }),
        _ => json!({ "$unwind": path }),
    }
}
