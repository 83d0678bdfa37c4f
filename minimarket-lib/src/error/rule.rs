//! RuleError for validation rule strings

/// Error raised when a rule string such as `"required|minLength:2"` is malformed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    /// The rule expects a parameter that was not given.
    #[error("Rule '{rule}' requires {expected} parameter(s)")]
    MissingParameter { rule: String, expected: usize },

    /// A parameter could not be parsed as the type the rule expects.
    #[error("Rule '{rule}' has invalid parameter '{value}': expected {expected}")]
    InvalidParameter {
        rule: String,
        value: String,
        expected: &'static str,
    },

    /// The `pattern` rule carries a regex that does not compile.
    #[error("Rule 'pattern' has invalid regex: {0}")]
    Pattern(#[from] regex::Error),
}

impl RuleError {
    /// Creates a new missing parameter error.
    pub fn missing(rule: impl Into<String>, expected: usize) -> Self {
        Self::MissingParameter {
            rule: rule.into(),
            expected,
        }
    }

    /// Creates a new invalid parameter error.
    pub fn invalid(rule: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidParameter {
            rule: rule.into(),
            value: value.into(),
            expected,
        }
    }
}
