use crate::{
    ir::{AggKind, Condition, Expr, JoinKind, JoinSpec, Op, OrderBy, QueryIr, SelectExpr},
    parser::{Clause, Token},
    translator::{LimitPolicy, TranslateError, TranslatorConfig},
};

/// What a clause handler did with the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Consumed this many tokens.
    Advance(usize),
    /// The clause register changed; handle the same token again.
    Reprocess,
}

/// Single pass state machine from tokens to a raw `QueryIr`.
///
/// A keyword token always switches the clause register and clears every
/// pending operand. Other tokens go to the handler of the current clause;
/// tokens a handler has no use for are skipped. Nothing is backtracked.
pub struct ClauseParser {
    tokens: Vec<Token>,
    position: usize,
    length: usize,
    clause: Clause,
    ir: QueryIr,

    policy: LimitPolicy,
    count_alias: String,

    pending_column: Option<Expr>,
    pending_op: Option<Op>,
    join_open: bool,
    on_left: Option<String>,
    count_taken: bool,
}

impl ClauseParser {
    pub fn new(tokens: Vec<Token>, config: &TranslatorConfig) -> Self {
        Self {
            length: tokens.len(),
            tokens,
            position: 0,
            clause: Clause::default(),
            ir: QueryIr::default(),
            policy: config.limit_policy,
            count_alias: config.count_alias.clone(),
            pending_column: None,
            pending_op: None,
            join_open: false,
            on_left: None,
            count_taken: false,
        }
    }

    /// Start in `clause` instead of SELECT.
    pub fn in_clause(mut self, clause: Clause) -> Self {
        self.enter(clause);
        self
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    fn peek(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.position + ahead)
    }

    fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn parse(mut self) -> Result<QueryIr, TranslateError> {
        while !self.eof() {
            let token = self.tokens[self.position].clone();

            let step = match &token {
                Token::Keyword(clause) => {
                    self.enter(*clause);
                    Step::Advance(1)
                }
                _ => self.parse_current(&token)?,
            };

            match step {
                Step::Advance(count) => self.jump(count),
                Step::Reprocess => {}
            }
        }

        tracing::trace!(ir = %self.ir, "clause parser finished");
        Ok(self.ir)
    }

    fn enter(&mut self, clause: Clause) {
        tracing::trace!(from = self.clause.sql_keyword(), to = clause.sql_keyword(), position = self.position, "clause transition");

        self.clause = clause;
        self.pending_column = None;
        self.pending_op = None;
        self.on_left = None;
        self.count_taken = false;
        if let Clause::Join(_) = clause {
            self.join_open = false;
        }
    }

    fn parse_current(&mut self, token: &Token) -> Result<Step, TranslateError> {
        let step = match self.clause {
            Clause::Select => self.parse_select(token),
            Clause::From => self.parse_from(token),
            Clause::Join(kind) => self.parse_join(kind, token),
            Clause::On => self.parse_on(token),
            Clause::Where | Clause::Having => self.parse_condition(token),
            Clause::GroupBy => self.parse_group_by(token),
            Clause::OrderBy => self.parse_order_by(token),
            Clause::Limit | Clause::Offset => self.parse_count(token)?,
        };

        Ok(step)
    }

    fn skip(&self, token: &Token) -> Step {
        tracing::trace!(token = ?token, clause = self.clause.sql_keyword(), position = self.position, "skipping token");
        Step::Advance(1)
    }

    fn parse_select(&mut self, token: &Token) -> Step {
        match token {
            Token::Aggregate(func) => match self.peek(1).and_then(Token::as_name) {
                Some(column) => {
                    self.ir.select.push(SelectExpr::aggregate(*func, column));
                    Step::Advance(2)
                }
                None if func.allows_wildcard() => {
                    self.ir.select.push(SelectExpr::aggregate(AggKind::Count, "*"));
                    Step::Advance(1)
                }
                None => self.skip(token),
            },
            Token::Identifier(name) | Token::Literal(name) => {
                self.ir.select.push(SelectExpr::column(name.as_str()));
                Step::Advance(1)
            }
            Token::Alias => {
                let alias = self.peek(1).and_then(Token::as_name);
                if let (Some(alias), Some(last)) = (alias, self.ir.select.last_mut()) {
                    last.alias = Some(alias);
                    return Step::Advance(2);
                }
                self.skip(token)
            }
            _ => self.skip(token),
        }
    }

    /// Only the first name counts; one source per query.
    fn parse_from(&mut self, token: &Token) -> Step {
        match (token.as_name(), &self.ir.source) {
            (Some(name), None) => {
                self.ir.source = Some(name);
                Step::Advance(1)
            }
            _ => self.skip(token),
        }
    }

    fn parse_join(&mut self, kind: JoinKind, token: &Token) -> Step {
        match token.as_name() {
            Some(table) if !self.join_open => {
                self.ir.joins.push(JoinSpec::new(kind, table));
                self.join_open = true;
                Step::Advance(1)
            }
            _ => self.skip(token),
        }
    }

    fn parse_on(&mut self, token: &Token) -> Step {
        match token {
            Token::Identifier(name) | Token::Literal(name) if self.on_left.is_none() => {
                self.on_left = Some(name.clone());
                Step::Advance(1)
            }
            Token::Comparator(op) => {
                let right = self.peek(1).and_then(Token::as_name);
                let (Some(left), Some(right)) = (self.on_left.take(), right) else {
                    return self.skip(token);
                };

                match self.ir.joins.last_mut() {
                    Some(join) if join.condition.is_none() => {
                        *join = join.clone().on(left, *op, right);
                    }
                    _ => {
                        tracing::trace!(left = %left, right = %right, "join condition without an open join, ignored");
                    }
                }
                Step::Advance(2)
            }
            _ => self.skip(token),
        }
    }

    /// WHERE and HAVING share one reader of `column comparator value`
    /// triples. The condition lands in `filters` or `post_filters`
    /// depending on its target, not on the clause it was written in.
    fn parse_condition(&mut self, token: &Token) -> Step {
        match token {
            Token::Aggregate(func) => {
                if self.clause == Clause::Having {
                    if let Some(step) = self.parse_having_shorthand(*func) {
                        return step;
                    }
                }

                match self.peek(1).and_then(Token::as_name) {
                    Some(column) => {
                        self.pending_column = Some(Expr::aggregate(*func, column));
                        self.pending_op = None;
                        Step::Advance(2)
                    }
                    None if func.allows_wildcard() => {
                        self.pending_column = Some(Expr::aggregate(AggKind::Count, "*"));
                        self.pending_op = None;
                        Step::Advance(1)
                    }
                    None => self.skip(token),
                }
            }
            Token::Comparator(op) if self.pending_column.is_some() => {
                self.pending_op = Some(*op);
                Step::Advance(1)
            }
            Token::Identifier(name) | Token::Literal(name) if self.pending_op.is_none() => {
                self.pending_column = Some(Expr::column(name.as_str()));
                Step::Advance(1)
            }
            Token::Identifier(_) | Token::Literal(_) | Token::Number(_) if self.pending_op.is_some() => {
                if let (Some(target), Some(op), Some(value)) =
                    (self.pending_column.take(), self.pending_op.take(), token.as_value())
                {
                    self.ir.push_condition(Condition::new(target, op, value));
                }
                Step::Advance(1)
            }
            _ => self.skip(token),
        }
    }

    /// `Aggregate Comparator value [column]`, as produced for
    /// "having more than N column". For COUNT the counted column defaults
    /// to the most recent select column, which also becomes the grouping
    /// key. Other aggregates name their column or reuse the selected
    /// aggregate of the same kind ("having total > 100").
    fn parse_having_shorthand(&mut self, func: AggKind) -> Option<Step> {
        let Some(Token::Comparator(op)) = self.peek(1) else {
            return None;
        };
        let op = *op;
        let value = match self.peek(2) {
            Some(token @ (Token::Number(_) | Token::Literal(_))) => token.as_value()?,
            _ => return None,
        };

        let counted = match self.peek(3) {
            Some(Token::Identifier(name)) => Some(name.clone()),
            _ => None,
        };
        let consumed = if counted.is_some() { 4 } else { 3 };

        if func != AggKind::Count {
            let target = match counted {
                Some(column) => Expr::aggregate(func, column),
                None => self.ir.select_aggregate(func).cloned()?,
            };
            tracing::trace!(target = %target, op = %op, value = %value, "having shorthand");
            self.ir.push_condition(Condition::new(target, op, value));
            return Some(Step::Advance(consumed));
        }

        let group = self.ir.last_select_column().map(str::to_string);
        let column = counted
            .or_else(|| group.clone())
            .unwrap_or_else(|| "*".to_string());
        let target = Expr::aggregate(func, column);

        if let Some(group) = group {
            if !self.ir.group_by.contains(&group) {
                self.ir.group_by.push(group);
            }
        }

        if !self.ir.selects(&target) {
            self.ir.select.push(SelectExpr::from(target.clone()).with_alias(self.count_alias.clone()));
        }

        tracing::trace!(target = %target, op = %op, value = %value, "having shorthand");
        self.ir.push_condition(Condition::new(target, op, value));

        Some(Step::Advance(consumed))
    }

    fn parse_group_by(&mut self, token: &Token) -> Step {
        match token.as_name() {
            Some(name) if !matches!(name.to_lowercase().as_str(), "group" | "by") => {
                self.ir.group_by.push(name);
                Step::Advance(1)
            }
            _ => self.skip(token),
        }
    }

    fn parse_order_by(&mut self, token: &Token) -> Step {
        match token {
            Token::Identifier(name) | Token::Literal(name) => {
                self.ir.order_by.push(OrderBy::asc(Expr::column(name.as_str())));
                Step::Advance(1)
            }
            Token::Aggregate(func) => match self.peek(1).and_then(Token::as_name) {
                Some(column) => {
                    self.ir.order_by.push(OrderBy::asc(Expr::aggregate(*func, column)));
                    Step::Advance(2)
                }
                None => {
                    // "sorted by total": the select list's aggregate, else its output name
                    let expr = self
                        .ir
                        .select_aggregate(*func)
                        .cloned()
                        .unwrap_or_else(|| Expr::column(func.default_output_name()));
                    self.ir.order_by.push(OrderBy::asc(expr));
                    Step::Advance(1)
                }
            },
            Token::Descending => {
                match self.ir.order_by.last_mut() {
                    Some(last) => last.descending = true,
                    None => return self.skip(token),
                }
                Step::Advance(1)
            }
            _ => self.skip(token),
        }
    }

    /// LIMIT and OFFSET take one row count. Anything after it, or anything
    /// other than a count right after the keyword, sends the parser back to
    /// SELECT under the revert policy.
    fn parse_count(&mut self, token: &Token) -> Result<Step, TranslateError> {
        if !self.count_taken {
            if let Some(count) = token.as_number().and_then(|n| n.as_count()) {
                match self.clause {
                    Clause::Offset => self.ir.offset = Some(count),
                    _ => self.ir.limit = Some(count),
                }
                self.count_taken = true;
                return Ok(Step::Advance(1));
            }

            if self.policy == LimitPolicy::Strict {
                return TranslateError::MalformedLimit { token: token.to_string(), position: self.position }.err();
            }
        }

        tracing::trace!(token = ?token, clause = self.clause.sql_keyword(), position = self.position, "reverting to SELECT");
        self.enter(Clause::Select);
        Ok(Step::Reprocess)
    }
}

/// Parse a token sequence with the default configuration.
pub fn parse_tokens(tokens: Vec<Token>) -> Result<QueryIr, TranslateError> {
    ClauseParser::new(tokens, &TranslatorConfig::default()).parse()
}
