use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// No source was named and no table/collection is active.
    UnresolvedSource,
    /// Strict limit policy: the token after LIMIT/OFFSET is not a row count.
    MalformedLimit { token: String, position: usize },
    /// A hand-built IR with a condition on the wrong side of grouping.
    MisplacedCondition { condition: String, clause: &'static str },
    InvalidConfig(String),
}

impl TranslateError {
    pub fn err<T>(self) -> Result<T, TranslateError> {
        Err(self)
    }
}

impl Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::UnresolvedSource => write!(
                f,
                "TranslateError: no table named in the request and no table has been uploaded yet"
            ),
            TranslateError::MalformedLimit { token, position } => write!(
                f,
                "TranslateError: expected a row count\n  at token {} -> '{}'",
                position, token
            ),
            TranslateError::MisplacedCondition { condition, clause } => write!(
                f,
                "TranslateError: condition '{}' cannot be placed in {}",
                condition, clause
            ),
            TranslateError::InvalidConfig(message) => write!(f, "TranslateError: {}", message),
        }
    }
}

impl std::error::Error for TranslateError {}

#[cfg(test)]
mod tests {
    use crate::translator::TranslateError;

    #[test]
    pub fn test_display_malformed_limit() {
        let err = TranslateError::MalformedLimit { token: "product_id".into(), position: 3 };
        assert_eq!(
            err.to_string(),
            "TranslateError: expected a row count\n  at token 3 -> 'product_id'"
        );
    }

    #[test]
    pub fn test_err_helper() {
        let result: Result<(), TranslateError> = TranslateError::UnresolvedSource.err();
        assert_eq!(result, Err(TranslateError::UnresolvedSource));
    }
}
