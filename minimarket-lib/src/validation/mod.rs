//! Form validation.
//!
//! Two front doors over the same checks:
//!
//! - [`Validator`], a fluent builder for validating values in code
//! - [`RuleSet`], which parses pipe-separated rule strings
//!   (`"required|minLength:2"`) and validates a whole form at once
//!
//! # Example
//!
//! ```
//! use minimarket_lib::validation::Validator;
//!
//! let result = Validator::new()
//!     .field("name", "Leche")
//!         .required("El nombre es obligatorio")
//!         .min_length(2, "Mínimo 2 caracteres")
//!     .field("email", "no-es-email")
//!         .email("Ingrese un email válido")
//!     .validate();
//!
//! assert!(result.is_invalid());
//! assert_eq!(result.first_error().unwrap().field_name, "email");
//! ```

mod messages;
mod result;
mod rules;
mod validator;

pub use messages::Messages;
pub use result::{FieldError, ValidationResult};
pub use rules::{FormData, Rule, RuleSet, parse_rules, validate_value};
pub use validator::{FieldBuilder, Validator};
