use crate::{
    ir::{QueryIr, SelectExpr},
    translator::{ActiveSource, TranslateError},
};

/// Turns the parser's raw IR into the form renderers accept.
///
/// - the source is the named table, else the active source, else an error
/// - blank select expressions and grouping columns are dropped
/// - grouping columns missing from the select list are prepended to it
/// - duplicate select expressions and grouping columns collapse to the first
///
/// Filters, joins and sort keys are kept as written, duplicates included.
pub struct Normalizer;

impl Normalizer {
    pub fn normalize(mut ir: QueryIr, resolver: &dyn ActiveSource) -> Result<QueryIr, TranslateError> {
        Self::check_condition_placement(&ir)?;

        ir.source = Some(Self::resolve_source(ir.source.take(), resolver)?);

        ir.select.retain(|s| !s.expr.is_blank());
        ir.group_by.retain(|g| !g.trim().is_empty());
        dedup_in_order(&mut ir.group_by);

        let missing: Vec<SelectExpr> = ir
            .group_by
            .iter()
            .filter(|g| !ir.selects_column(g))
            .map(SelectExpr::column)
            .collect();
        if !missing.is_empty() {
            tracing::trace!(columns = ?missing, "folding grouping columns into select list");
            ir.select.splice(0..0, missing);
        }
        dedup_in_order(&mut ir.select);

        Ok(ir)
    }

    fn resolve_source(named: Option<String>, resolver: &dyn ActiveSource) -> Result<String, TranslateError> {
        if let Some(name) = named.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            tracing::debug!(source = %name, "using source named in request");
            return Ok(name);
        }

        match resolver.resolve_active_source().filter(|n| !n.trim().is_empty()) {
            Some(name) => {
                tracing::debug!(source = %name, "using active source");
                Ok(name)
            }
            None => TranslateError::UnresolvedSource.err(),
        }
    }

    fn check_condition_placement(ir: &QueryIr) -> Result<(), TranslateError> {
        if let Some(condition) = ir.filters.iter().find(|c| c.is_aggregated()) {
            return TranslateError::MisplacedCondition { condition: condition.to_string(), clause: "WHERE" }.err();
        }

        if let Some(condition) = ir.post_filters.iter().find(|c| !c.is_aggregated()) {
            return TranslateError::MisplacedCondition { condition: condition.to_string(), clause: "HAVING" }.err();
        }

        Ok(())
    }
}

fn dedup_in_order<T: PartialEq + Clone>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(item.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::{
        ir::{AggKind, Condition, Expr, Normalizer, Number, Op, QueryIr, SelectExpr, Value},
        translator::{NoActiveSource, TranslateError},
    };

    fn active(name: &str) -> Option<String> {
        Some(name.to_string())
    }

    #[test]
    pub fn test_source_from_request_wins() {
        let ir = QueryIr { source: Some("employees".into()), ..Default::default() };

        let ir = Normalizer::normalize(ir, &active("sales")).expect("normalize");

        assert_eq!(ir.source.as_deref(), Some("employees"));
    }

    #[test]
    pub fn test_source_from_resolver() {
        let ir = Normalizer::normalize(QueryIr::default(), &active("orders")).expect("normalize");

        assert_eq!(ir.source.as_deref(), Some("orders"));
    }

    #[test]
    pub fn test_unresolved_source() {
        let result = Normalizer::normalize(QueryIr::default(), &NoActiveSource);
        assert_eq!(result, Err(TranslateError::UnresolvedSource));

        let ir = QueryIr { source: Some("   ".into()), ..Default::default() };
        let result = Normalizer::normalize(ir, &active(" "));
        assert_eq!(result, Err(TranslateError::UnresolvedSource));
    }

    #[test]
    pub fn test_group_columns_folded_first() {
        let ir = QueryIr {
            select: vec![SelectExpr::aggregate(AggKind::Sum, "sales")],
            group_by: vec!["category".into(), "region".into()],
            ..Default::default()
        };

        let ir = Normalizer::normalize(ir, &active("sales")).expect("normalize");

        let select: Vec<String> = ir.select.iter().map(|s| s.to_string()).collect();
        assert_eq!(select, vec!["category", "region", "SUM(sales)"]);
    }

    #[test]
    pub fn test_group_column_already_selected_is_not_repeated() {
        let ir = QueryIr {
            select: vec![SelectExpr::column("instructorName"), SelectExpr::aggregate(AggKind::Count, "courseName")],
            group_by: vec!["instructorName".into(), "instructorName".into()],
            ..Default::default()
        };

        let ir = Normalizer::normalize(ir, &active("courses")).expect("normalize");

        assert_eq!(ir.select.len(), 2);
        assert_eq!(ir.group_by, vec!["instructorName".to_string()]);
    }

    #[test]
    pub fn test_blank_and_duplicate_select_dropped() {
        let ir = QueryIr {
            select: vec![SelectExpr::column("name"), SelectExpr::column(" "), SelectExpr::column("name")],
            ..Default::default()
        };

        let ir = Normalizer::normalize(ir, &active("people")).expect("normalize");

        assert_eq!(ir.select, vec![SelectExpr::column("name")]);
    }

    #[test]
    pub fn test_duplicate_filters_preserved() {
        let condition = Condition::new(Expr::column("age"), Op::Gt, Value::Number(Number::Int(3)));
        let ir = QueryIr { filters: vec![condition.clone(), condition], ..Default::default() };

        let ir = Normalizer::normalize(ir, &active("people")).expect("normalize");

        assert_eq!(ir.filters.len(), 2);
    }

    #[test]
    pub fn test_misplaced_conditions_rejected() {
        let aggregated = Condition::new(Expr::aggregate(AggKind::Count, "id"), Op::Gt, Value::Number(Number::Int(1)));
        let ir = QueryIr { filters: vec![aggregated], source: Some("t".into()), ..Default::default() };
        assert!(matches!(
            Normalizer::normalize(ir, &NoActiveSource),
            Err(TranslateError::MisplacedCondition { clause: "WHERE", .. })
        ));

        let plain = Condition::new(Expr::column("id"), Op::Gt, Value::Number(Number::Int(1)));
        let ir = QueryIr { post_filters: vec![plain], source: Some("t".into()), ..Default::default() };
        assert!(matches!(
            Normalizer::normalize(ir, &NoActiveSource),
            Err(TranslateError::MisplacedCondition { clause: "HAVING", .. })
        ));
    }
}
