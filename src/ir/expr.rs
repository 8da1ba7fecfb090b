use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate functions the lexicon can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggKind {
    Avg,
    Sum,
    Count,
    Max,
    Min,
    Distinct,
}

impl AggKind {
    pub const ALL: [AggKind; 6] = [
        AggKind::Avg,
        AggKind::Sum,
        AggKind::Count,
        AggKind::Max,
        AggKind::Min,
        AggKind::Distinct,
    ];

    pub fn sql_name(&self) -> &'static str {
        match self {
            AggKind::Avg => "AVG",
            AggKind::Sum => "SUM",
            AggKind::Count => "COUNT",
            AggKind::Max => "MAX",
            AggKind::Min => "MIN",
            AggKind::Distinct => "DISTINCT",
        }
    }

    /// Output field name used when the expression has no alias.
    pub fn default_output_name(&self) -> &'static str {
        match self {
            AggKind::Avg => "average",
            AggKind::Sum => "total",
            AggKind::Count => "count",
            AggKind::Max => "maximum",
            AggKind::Min => "minimum",
            AggKind::Distinct => "distinct",
        }
    }

    /// An aggregate with no usable argument still makes sense for COUNT only.
    pub fn allows_wildcard(&self) -> bool {
        matches!(self, AggKind::Count)
    }
}

impl fmt::Display for AggKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A column reference, optionally wrapped in one aggregate.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Column(String),
    Aggregate { func: AggKind, column: String },
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn aggregate(func: AggKind, column: impl Into<String>) -> Self {
        Expr::Aggregate { func, column: column.into() }
    }

    /// The referenced column, without the aggregate.
    pub fn column_name(&self) -> &str {
        match self {
            Expr::Column(name) => name,
            Expr::Aggregate { column, .. } => column,
        }
    }

    pub fn aggregate_kind(&self) -> Option<AggKind> {
        match self {
            Expr::Column(_) => None,
            Expr::Aggregate { func, .. } => Some(*func),
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Aggregate { .. })
    }

    pub fn is_blank(&self) -> bool {
        self.column_name().trim().is_empty()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => f.write_str(name),
            Expr::Aggregate { func: AggKind::Distinct, column } => write!(f, "COUNT(DISTINCT {})", column),
            Expr::Aggregate { func, column } => write!(f, "{}({})", func, column),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(_) => write!(f, "Expr::Column({})", self),
            Expr::Aggregate { .. } => write!(f, "Expr::Aggregate({})", self),
        }
    }
}

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn column(name: impl Into<String>) -> Self {
        Self { expr: Expr::column(name), alias: None }
    }

    pub fn aggregate(func: AggKind, column: impl Into<String>) -> Self {
        Self { expr: Expr::aggregate(func, column), alias: None }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}

impl fmt::Display for SelectExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.expr, alias),
            None => write!(f, "{}", self.expr),
        }
    }
}

/// Sort key; ascending unless `descending` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(expr: Expr) -> Self {
        Self { expr, descending: false }
    }

    pub fn desc(expr: Expr) -> Self {
        Self { expr, descending: true }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} DESC", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}
