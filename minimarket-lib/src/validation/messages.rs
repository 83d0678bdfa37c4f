//! Error messages of the rule dialect.

use std::collections::HashMap;

use super::rules::Rule;

/// Message used for rules without one of their own.
const FALLBACK: &str = "Valor inválido";

fn default_message(rule: &str) -> &'static str {
    match rule {
        "required" => "Este campo es obligatorio",
        "email" => "Ingrese un email válido",
        "min" => "El valor mínimo es {min}",
        "max" => "El valor máximo es {max}",
        "minLength" => "Mínimo {min} caracteres",
        "maxLength" => "Máximo {max} caracteres",
        "pattern" => "Formato inválido",
        "numeric" => "Solo se permiten números",
        "alpha" => "Solo se permiten letras",
        "alphanumeric" => "Solo se permiten letras y números",
        "phone" => "Ingrese un teléfono válido",
        "url" => "Ingrese una URL válida",
        "date" => "Ingrese una fecha válida",
        "time" => "Ingrese una hora válida",
        "decimal" => "Ingrese un número decimal válido",
        "integer" => "Ingrese un número entero válido",
        "positive" => "El valor debe ser positivo",
        "negative" => "El valor debe ser negativo",
        "range" => "El valor debe estar entre {min} y {max}",
        "same" => "Los campos no coinciden",
        "different" => "Los campos deben ser diferentes",
        _ => FALLBACK,
    }
}

/// Message templates per rule name, with overrides.
///
/// Templates may use `{min}` and `{max}`, filled from the rule's
/// parameters.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    overrides: HashMap<String, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the template of `rule` (e.g. `"minLength"`).
    pub fn set(&mut self, rule: impl Into<String>, template: impl Into<String>) {
        self.overrides.insert(rule.into(), template.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, rule: impl Into<String>, template: impl Into<String>) -> Self {
        self.set(rule, template);
        self
    }

    /// The template of a rule name.
    pub fn template(&self, rule: &str) -> &str {
        self.overrides
            .get(rule)
            .map(String::as_str)
            .unwrap_or_else(|| default_message(rule))
    }

    /// The filled-in message for a failed rule.
    pub fn message(&self, rule: &Rule) -> String {
        let mut message = self.template(rule.name()).to_string();
        let (min, max) = rule.bounds();
        if let Some(min) = min {
            message = message.replace("{min}", &min);
        }
        if let Some(max) = max {
            message = message.replace("{max}", &max);
        }
        message
    }
}
