use std::fmt;

use crate::{
    ir::{AggKind, Number, Op, Value},
    parser::Clause,
};

/// Unit of clause-parser input. Multi-word idioms are already collapsed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Keyword(Clause),
    Aggregate(AggKind),
    Comparator(Op),
    /// Quoted text, quotes stripped, casing kept.
    Literal(String),
    Number(Number),
    /// Free word, original casing kept.
    Identifier(String),
    /// "desc", "descending", "in descending order"...
    Descending,
    /// "as", "named", "called"
    Alias,
}

impl Token {
    pub fn identifier(name: &str) -> Self {
        Token::Identifier(name.to_string())
    }

    pub fn literal(text: &str) -> Self {
        Token::Literal(text.to_string())
    }

    pub fn int(value: i64) -> Self {
        Token::Number(Number::Int(value))
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Token::Keyword(_))
    }

    /// Text usable as a column, table or join operand.
    pub fn as_name(&self) -> Option<String> {
        match self {
            Token::Identifier(name) | Token::Literal(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Right-hand side of a condition: numbers stay numeric, everything
    /// else is text.
    pub fn as_value(&self) -> Option<Value> {
        match self {
            Token::Number(number) => Some(Value::Number(*number)),
            Token::Literal(text) | Token::Identifier(text) => Some(Value::Text(text.clone())),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Token::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(clause) => f.write_str(clause.sql_keyword()),
            Token::Aggregate(func) => write!(f, "{}", func),
            Token::Comparator(op) => write!(f, "{}", op),
            Token::Literal(text) => write!(f, "'{}'", text),
            Token::Number(number) => write!(f, "{}", number),
            Token::Identifier(name) => f.write_str(name),
            Token::Descending => f.write_str("DESC"),
            Token::Alias => f.write_str("AS"),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(_) => write!(f, "Keyword({})", self),
            Token::Aggregate(_) => write!(f, "Aggregate({})", self),
            Token::Comparator(_) => write!(f, "Comparator({})", self),
            Token::Literal(_) => write!(f, "Literal({})", self),
            Token::Number(_) => write!(f, "Number({})", self),
            Token::Identifier(_) => write!(f, "Identifier({})", self),
            Token::Descending => f.write_str("Descending"),
            Token::Alias => f.write_str("Alias"),
        }
    }
}
