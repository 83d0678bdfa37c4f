//! Display formatting for amounts, dates and identifiers.
//!
//! A [`Formatter`] is built from [`FormatSettings`] and passed to whoever
//! needs it; there is no process-wide instance. Defaults follow the `es-PE`
//! conventions the panel was built for (`S/ 1,234.50`, `05/01/2024`).

mod text;

pub use text::{capitalize, list, slug, title_case, truncate, url};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::Value;

/// Locale-dependent formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Locale tag, informational.
    pub locale: String,
    /// ISO currency code, informational.
    pub currency: String,
    /// Symbol printed before amounts.
    pub currency_symbol: String,
    /// Digit group separator.
    pub thousands_separator: char,
    /// Decimal separator.
    pub decimal_separator: char,
    /// chrono pattern for dates.
    pub date_format: String,
    /// chrono pattern for times.
    pub time_format: String,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            locale: "es-PE".to_string(),
            currency: "PEN".to_string(),
            currency_symbol: "S/".to_string(),
            thousands_separator: ',',
            decimal_separator: '.',
            date_format: "%d/%m/%Y".to_string(),
            time_format: "%H:%M".to_string(),
        }
    }
}

/// Phone number layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneFormat {
    #[default]
    National,
    International,
}

/// Identity document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// 8-digit national id.
    Dni,
    /// 11-digit taxpayer id.
    Ruc,
}

/// Which status vocabulary to translate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    Default,
    Payment,
    Order,
}

/// Formats values for display according to [`FormatSettings`].
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    settings: FormatSettings,
}

impl Formatter {
    /// Create a formatter with the given settings.
    pub fn new(settings: FormatSettings) -> Self {
        Self { settings }
    }

    /// The settings in use.
    pub fn settings(&self) -> &FormatSettings {
        &self.settings
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    /// Format an amount as currency with two decimals: `S/ 1,234.50`.
    pub fn currency(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let body = self.fixed(amount.abs(), 2, 2);
        if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{} {}", self.settings.currency_symbol, body)
        } else {
            format!("{} {}", self.settings.currency_symbol, body)
        }
    }

    /// Format a number with grouping and at most two decimals: `1,234.5`.
    pub fn number(&self, value: f64) -> String {
        self.number_with(value, 0, 2)
    }

    /// Format a number with explicit fraction digit bounds.
    pub fn number_with(&self, value: f64, min_fraction: usize, max_fraction: usize) -> String {
        let value = if value.is_finite() { value } else { 0.0 };
        let body = self.fixed(value.abs(), min_fraction, max_fraction.max(min_fraction));
        if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            format!("-{}", body)
        } else {
            body
        }
    }

    /// Format a ratio as a percentage.
    ///
    /// Values above 1 are taken as already being percentages (`12.5` and
    /// `0.125` both print `12.5%`).
    pub fn percentage(&self, value: f64) -> String {
        let ratio = if value > 1.0 { value / 100.0 } else { value };
        format!("{}%", self.number(ratio * 100.0))
    }

    fn fixed(&self, value: f64, min_fraction: usize, max_fraction: usize) -> String {
        let rendered = format!("{:.*}", max_fraction, value);
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some((i, f)) => (i.to_string(), f.to_string()),
            None => (rendered, String::new()),
        };

        let mut frac = frac_part;
        while frac.len() > min_fraction && frac.ends_with('0') {
            frac.pop();
        }

        let grouped = group_digits(&int_part, self.settings.thousands_separator);
        if frac.is_empty() {
            grouped
        } else {
            format!("{}{}{}", grouped, self.settings.decimal_separator, frac)
        }
    }

    /// Human-readable byte count: `0 Bytes`, `1.5 KB`, `3 MB`.
    pub fn file_size(&self, bytes: u64, decimals: usize) -> String {
        const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
        if bytes == 0 {
            return "0 Bytes".to_string();
        }
        let mut exponent = 0;
        let mut scaled = bytes as f64;
        while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
            scaled /= 1024.0;
            exponent += 1;
        }
        format!("{} {}", self.number_with(scaled, 0, decimals), UNITS[exponent])
    }

    // =========================================================================
    // Dates
    // =========================================================================

    /// Format a date value (`05/01/2024`). Values that are not dates print empty.
    pub fn date(&self, value: &Value) -> String {
        self.with_datetime(value, &self.settings.date_format)
    }

    /// Format the time of day (`14:05`).
    pub fn time(&self, value: &Value) -> String {
        self.with_datetime(value, &self.settings.time_format)
    }

    /// Format date and time (`05/01/2024, 14:05`).
    pub fn date_time(&self, value: &Value) -> String {
        let pattern = format!("{}, {}", self.settings.date_format, self.settings.time_format);
        self.with_datetime(value, &pattern)
    }

    fn with_datetime(&self, value: &Value, pattern: &str) -> String {
        match value.as_datetime() {
            Some(dt) => dt.format(pattern).to_string(),
            None => String::new(),
        }
    }

    /// Describe how long ago `at` was, relative to `now`.
    pub fn relative_time(&self, at: NaiveDateTime, now: NaiveDateTime) -> String {
        let seconds = (now - at).num_seconds();
        let plural = |n: i64, one: &str, many: &str| {
            format!("Hace {} {}", n, if n > 1 { many } else { one })
        };
        match seconds {
            s if s < 60 => "Hace un momento".to_string(),
            s if s < 3_600 => plural(s / 60, "minuto", "minutos"),
            s if s < 86_400 => plural(s / 3_600, "hora", "horas"),
            s if s < 2_592_000 => plural(s / 86_400, "día", "días"),
            s if s < 31_536_000 => plural(s / 2_592_000, "mes", "meses"),
            s => plural(s / 31_536_000, "año", "años"),
        }
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Format a Peruvian phone number. Unknown shapes are returned unchanged.
    pub fn phone(&self, phone: &str, format: PhoneFormat) -> String {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() == 9 && digits.starts_with('9') {
            let local = format!("{} {} {}", &digits[0..3], &digits[3..6], &digits[6..]);
            return match format {
                PhoneFormat::National => local,
                PhoneFormat::International => format!("+51 {}", local),
            };
        }
        if digits.len() == 7 {
            return format!("{} {}", &digits[0..3], &digits[3..]);
        }
        phone.to_string()
    }

    /// Format a DNI (`12.345.678`) or RUC (`20-12345678-9`).
    pub fn document(&self, number: &str, kind: DocumentKind) -> String {
        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        match kind {
            DocumentKind::Dni if digits.len() == 8 => {
                format!("{}.{}.{}", &digits[0..2], &digits[2..5], &digits[5..])
            }
            DocumentKind::Ruc if digits.len() == 11 => {
                format!("{}-{}-{}", &digits[0..2], &digits[2..10], &digits[10..])
            }
            _ => number.to_string(),
        }
    }

    /// Group a card number in blocks of four, optionally masking all but the
    /// last four digits.
    pub fn credit_card(&self, number: &str, mask: bool) -> String {
        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        let shown: String = if mask && digits.len() >= 4 {
            let hidden = digits.len() - 4;
            "*".repeat(hidden) + &digits[hidden..]
        } else {
            digits
        };
        shown
            .chars()
            .collect::<Vec<_>>()
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Translate a status code for display.
    pub fn status(&self, status: &str, kind: StatusKind) -> String {
        let key = status.to_lowercase();
        let label = match (kind, key.as_str()) {
            (StatusKind::Default, "active") => Some("Activo"),
            (StatusKind::Default, "inactive") => Some("Inactivo"),
            (StatusKind::Default, "completed") => Some("Completado"),
            (StatusKind::Payment, "paid") => Some("Pagado"),
            (StatusKind::Payment, "overdue") => Some("Vencido"),
            (StatusKind::Order, "draft") => Some("Borrador"),
            (StatusKind::Order, "processing") => Some("Procesando"),
            (StatusKind::Order, "shipped") => Some("Enviado"),
            (StatusKind::Order, "delivered") => Some("Entregado"),
            (_, "pending") => Some("Pendiente"),
            (_, "cancelled") => Some("Cancelado"),
            _ => None,
        };
        match label {
            Some(label) => label.to_string(),
            None => capitalize(status),
        }
    }
}

/// Insert `separator` between groups of three digits.
fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
