//! Rule-string dialect: `"required|minLength:2|maxLength:50"`.
//!
//! Rules are separated by `|`; parameters follow a `:` and are separated
//! by `,`. The parameter of `pattern` is taken whole, so regexes may
//! contain commas and colons. Unknown rule names are skipped with a
//! warning. Every rule except `required`, `same` and `different` accepts
//! an empty value; combine with `required` to reject it.

use std::collections::BTreeMap;

use email_address::EmailAddress;
use regex::Regex;
use url::Url;

use crate::error::RuleError;
use crate::table::Value;

use super::messages::Messages;
use super::result::{FieldError, ValidationResult};

/// Submitted form values by field name.
pub type FormData = BTreeMap<String, String>;

/// One parsed rule.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Email,
    Min(f64),
    Max(f64),
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Numeric,
    Alpha,
    Alphanumeric,
    /// Peruvian mobile number, optionally prefixed with `+51`.
    Phone,
    Url,
    Date,
    /// `H:MM` or `HH:MM`, 24-hour clock.
    Time,
    Decimal,
    Integer,
    Positive,
    Negative,
    Range(f64, f64),
    /// Equal to another field of the form.
    Same(String),
    /// Different from another field of the form.
    Different(String),
}

impl Rule {
    /// Parse one rule from its name and raw parameter text.
    ///
    /// Returns `Ok(None)` for unknown names.
    pub fn parse(name: &str, params: Option<&str>) -> Result<Option<Self>, RuleError> {
        let list: Vec<&str> = params
            .map(|p| p.split(',').map(str::trim).collect())
            .unwrap_or_default();

        let rule = match name {
            "required" => Rule::Required,
            "email" => Rule::Email,
            "min" => Rule::Min(number(name, &list, 0)?),
            "max" => Rule::Max(number(name, &list, 0)?),
            "minLength" => Rule::MinLength(length(name, &list, 0)?),
            "maxLength" => Rule::MaxLength(length(name, &list, 0)?),
            "pattern" => {
                let pattern = params.ok_or_else(|| RuleError::missing(name, 1))?;
                Rule::Pattern(Regex::new(pattern)?)
            }
            "numeric" => Rule::Numeric,
            "alpha" => Rule::Alpha,
            "alphanumeric" => Rule::Alphanumeric,
            "phone" => Rule::Phone,
            "url" => Rule::Url,
            "date" => Rule::Date,
            "time" => Rule::Time,
            "decimal" => Rule::Decimal,
            "integer" => Rule::Integer,
            "positive" => Rule::Positive,
            "negative" => Rule::Negative,
            "range" => Rule::Range(number(name, &list, 0)?, number(name, &list, 1)?),
            "same" => Rule::Same(field(name, &list)?),
            "different" => Rule::Different(field(name, &list)?),
            _ => return Ok(None),
        };
        Ok(Some(rule))
    }

    /// The rule's name in the dialect.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Email => "email",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::MinLength(_) => "minLength",
            Rule::MaxLength(_) => "maxLength",
            Rule::Pattern(_) => "pattern",
            Rule::Numeric => "numeric",
            Rule::Alpha => "alpha",
            Rule::Alphanumeric => "alphanumeric",
            Rule::Phone => "phone",
            Rule::Url => "url",
            Rule::Date => "date",
            Rule::Time => "time",
            Rule::Decimal => "decimal",
            Rule::Integer => "integer",
            Rule::Positive => "positive",
            Rule::Negative => "negative",
            Rule::Range(..) => "range",
            Rule::Same(_) => "same",
            Rule::Different(_) => "different",
        }
    }

    /// Values for the `{min}` and `{max}` message placeholders.
    pub fn bounds(&self) -> (Option<String>, Option<String>) {
        match self {
            Rule::Min(min) => (Some(min.to_string()), None),
            Rule::Max(max) => (None, Some(max.to_string())),
            Rule::MinLength(min) => (Some(min.to_string()), None),
            Rule::MaxLength(max) => (None, Some(max.to_string())),
            Rule::Range(min, max) => (Some(min.to_string()), Some(max.to_string())),
            _ => (None, None),
        }
    }

    /// Check `value`. `data` supplies the other fields for `same` and
    /// `different`.
    pub fn check(&self, value: &str, data: &FormData) -> bool {
        match self {
            Rule::Required => !value.trim().is_empty(),
            Rule::Same(other) => data.get(other).is_some_and(|o| o == value),
            Rule::Different(other) => data.get(other).is_none_or(|o| o != value),
            _ if value.is_empty() => true,
            Rule::Email => EmailAddress::is_valid(value),
            Rule::Min(min) => as_number(value).is_some_and(|n| n >= *min),
            Rule::Max(max) => as_number(value).is_some_and(|n| n <= *max),
            Rule::MinLength(min) => value.chars().count() >= *min,
            Rule::MaxLength(max) => value.chars().count() <= *max,
            Rule::Pattern(re) => re.is_match(value),
            Rule::Numeric | Rule::Integer => is_digits(value),
            Rule::Alpha => value.chars().all(|c| is_letter(c) || c.is_whitespace()),
            Rule::Alphanumeric => value
                .chars()
                .all(|c| is_letter(c) || c.is_ascii_digit() || c.is_whitespace()),
            Rule::Phone => is_phone(value),
            Rule::Url => Url::parse(value).is_ok(),
            Rule::Date => Value::from(value).as_datetime().is_some(),
            Rule::Time => is_time(value),
            Rule::Decimal => is_decimal(value),
            Rule::Positive => as_number(value).is_some_and(|n| n > 0.0),
            Rule::Negative => as_number(value).is_some_and(|n| n < 0.0),
            Rule::Range(min, max) => as_number(value).is_some_and(|n| n >= *min && n <= *max),
        }
    }
}

fn number(rule: &str, params: &[&str], index: usize) -> Result<f64, RuleError> {
    let raw = params
        .get(index)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RuleError::missing(rule, index + 1))?;
    raw.parse()
        .map_err(|_| RuleError::invalid(rule, *raw, "a number"))
}

fn length(rule: &str, params: &[&str], index: usize) -> Result<usize, RuleError> {
    let raw = params
        .get(index)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RuleError::missing(rule, index + 1))?;
    raw.parse()
        .map_err(|_| RuleError::invalid(rule, *raw, "a non-negative integer"))
}

fn field(rule: &str, params: &[&str]) -> Result<String, RuleError> {
    params
        .first()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .ok_or_else(|| RuleError::missing(rule, 1))
}

fn as_number(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || "áéíóúÁÉÍÓÚñÑ".contains(c)
}

fn is_decimal(value: &str) -> bool {
    match value.split_once('.') {
        Some((int, frac)) => is_digits(int) && is_digits(frac),
        None => is_digits(value),
    }
}

fn is_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    let hours_ok = (1..=2).contains(&hours.len())
        && is_digits(hours)
        && hours.parse::<u8>().is_ok_and(|h| h <= 23);
    let minutes_ok = minutes.len() == 2
        && is_digits(minutes)
        && minutes.parse::<u8>().is_ok_and(|m| m <= 59);
    hours_ok && minutes_ok
}

fn is_phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let mobile = |s: &str| s.len() == 9 && s.starts_with('9') && is_digits(s);
    mobile(&compact)
        || compact.strip_prefix("+51").is_some_and(mobile)
        || compact.strip_prefix("51").is_some_and(mobile)
}

/// Parse a rule string.
///
/// Unknown rule names are skipped with a warning; malformed parameters are
/// errors.
pub fn parse_rules(rules: &str) -> Result<Vec<Rule>, RuleError> {
    let mut parsed = Vec::new();
    for part in rules.split('|').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, params) = match part.split_once(':') {
            Some((name, params)) => (name.trim(), Some(params)),
            None => (part, None),
        };
        match Rule::parse(name, params)? {
            Some(rule) => parsed.push(rule),
            None => log::warn!("Validation rule '{}' not found", name),
        }
    }
    Ok(parsed)
}

/// Check `value` against every rule, returning the messages of the failed
/// ones in rule order.
pub fn validate_value(value: &str, rules: &[Rule], data: &FormData, messages: &Messages) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| !rule.check(value, data))
        .map(|rule| messages.message(rule))
        .collect()
}

/// Rules for the fields of a form.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    /// Parse `(field, rule string)` pairs.
    pub fn parse<I, K, V>(fields: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|(field, rules)| Ok((field.into(), parse_rules(rules.as_ref())?)))
            .collect::<Result<Vec<_>, RuleError>>()?;
        Ok(Self { fields })
    }

    /// User account form.
    pub fn user() -> Result<Self, RuleError> {
        Self::parse([
            ("name", "required|alpha|minLength:2|maxLength:50"),
            ("email", "required|email"),
            ("password", "required|minLength:8"),
            ("confirmPassword", "required|same:password"),
        ])
    }

    /// Product form.
    pub fn product() -> Result<Self, RuleError> {
        Self::parse([
            ("name", "required|minLength:2|maxLength:100"),
            ("price", "required|decimal|positive"),
            ("stock", "required|integer|min:0"),
            ("category", "required"),
        ])
    }

    /// Client form.
    pub fn client() -> Result<Self, RuleError> {
        Self::parse([
            ("name", "required|alpha|minLength:2|maxLength:100"),
            ("email", "email"),
            ("phone", "phone"),
            ("dni", r"pattern:^\d{8}$"),
            ("address", "maxLength:200"),
        ])
    }

    /// Sale form.
    pub fn sale() -> Result<Self, RuleError> {
        Self::parse([
            ("clientId", "required"),
            ("products", "required"),
            ("total", "required|decimal|positive"),
            ("paymentMethod", "required"),
        ])
    }

    /// A predefined rule set by name.
    pub fn named(name: &str) -> Option<Result<Self, RuleError>> {
        match name {
            "user" => Some(Self::user()),
            "product" => Some(Self::product()),
            "client" => Some(Self::client()),
            "sale" => Some(Self::sale()),
            _ => None,
        }
    }

    /// Rules of one field.
    pub fn get(&self, field: &str) -> Option<&[Rule]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate every field of `data`. Missing fields count as empty.
    /// Each failed field reports its first message.
    pub fn validate(&self, data: &FormData, messages: &Messages) -> ValidationResult {
        let errors = self
            .fields
            .iter()
            .filter_map(|(field, rules)| {
                let value = data.get(field).map(String::as_str).unwrap_or("");
                validate_value(value, rules, data, messages)
                    .into_iter()
                    .next()
                    .map(|message| FieldError {
                        field_name: field.clone(),
                        message,
                    })
            })
            .collect();
        ValidationResult::from_errors(errors)
    }
}
