//! Validator builder for fluent validation API.

use email_address::EmailAddress;
use regex::Regex;

use super::result::{FieldError, ValidationResult};
use super::rules::{FormData, Rule};

/// Sync validation rule closure.
type CheckFn = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// A field with its value and rules.
struct FieldEntry {
    name: String,
    value: String,
    rules: Vec<CheckFn>,
}

impl FieldEntry {
    fn first_error(&self) -> Option<String> {
        self.rules.iter().find_map(|rule| rule(&self.value).err())
    }
}

/// Builder for validating multiple form fields.
///
/// Each field reports only its first failing rule.
///
/// # Example
///
/// ```
/// use minimarket_lib::validation::Validator;
///
/// let result = Validator::new()
///     .field("name", "Arroz")
///         .required("El nombre es obligatorio")
///     .field("stock", "-1")
///         .rule(|v| v.parse::<i64>().is_ok_and(|n| n >= 0), "Stock inválido")
///     .validate();
///
/// assert_eq!(result.errors().len(), 1);
/// ```
pub struct Validator {
    fields: Vec<FieldEntry>,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to validate.
    pub fn field(self, name: impl Into<String>, value: impl Into<String>) -> FieldBuilder {
        FieldBuilder {
            validator: self,
            entry: FieldEntry {
                name: name.into(),
                value: value.into(),
                rules: Vec::new(),
            },
        }
    }

    /// Run all validations.
    pub fn validate(self) -> ValidationResult {
        let errors = self
            .fields
            .iter()
            .filter_map(|field| {
                field.first_error().map(|message| FieldError {
                    field_name: field.name.clone(),
                    message,
                })
            })
            .collect();
        ValidationResult::from_errors(errors)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for adding validation rules to a single field.
pub struct FieldBuilder {
    validator: Validator,
    entry: FieldEntry,
}

impl FieldBuilder {
    /// Add a custom validation rule.
    pub fn rule<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        self.entry
            .rules
            .push(Box::new(move |v| if f(v) { Ok(()) } else { Err(msg.clone()) }));
        self
    }

    /// Add a parsed dialect rule. `same` and `different` see no other
    /// fields here; use a [`RuleSet`](super::RuleSet) for those.
    pub fn check(self, rule: Rule, msg: impl Into<String>) -> Self {
        let empty = FormData::new();
        self.rule(move |v| rule.check(v, &empty), msg)
    }

    /// Continue to the next field.
    pub fn field(self, name: impl Into<String>, value: impl Into<String>) -> FieldBuilder {
        self.finalize().field(name, value)
    }

    /// Finalize and run all validations.
    pub fn validate(self) -> ValidationResult {
        self.finalize().validate()
    }

    /// Finalize this field and return the validator.
    fn finalize(self) -> Validator {
        let mut validator = self.validator;
        validator.fields.push(self.entry);
        validator
    }

    /// Require the field to be non-empty.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(|v| !v.trim().is_empty(), msg)
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.chars().count() >= min, msg)
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.chars().count() <= max, msg)
    }

    /// Require the value to match a regex.
    pub fn pattern(self, re: Regex, msg: impl Into<String>) -> Self {
        self.rule(move |v| re.is_match(v), msg)
    }

    /// Require a valid email address. Empty is valid; use `required()`
    /// for non-empty.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(|v| v.is_empty() || EmailAddress::is_valid(v), msg)
    }

    /// Require a number within `[min, max]`.
    pub fn range(self, min: f64, max: f64, msg: impl Into<String>) -> Self {
        self.check(Rule::Range(min, max), msg)
    }

    /// Require a Peruvian mobile number.
    pub fn phone(self, msg: impl Into<String>) -> Self {
        self.check(Rule::Phone, msg)
    }

    /// Require an absolute URL.
    pub fn url(self, msg: impl Into<String>) -> Self {
        self.check(Rule::Url, msg)
    }

    /// Require the value to equal another value.
    pub fn equals(self, other: impl Into<String>, msg: impl Into<String>) -> Self {
        let other = other.into();
        self.rule(move |v| v == other, msg)
    }

    /// Require the value to contain a substring.
    pub fn contains(self, substr: impl Into<String>, msg: impl Into<String>) -> Self {
        let substr = substr.into();
        self.rule(move |v| v.contains(&substr), msg)
    }
}
