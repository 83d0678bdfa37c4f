//! Panel configuration.
//!
//! Loaded from a TOML file. Every section and key is optional:
//!
//! ```toml
//! [format]
//! currency_symbol = "S/"
//!
//! [table]
//! page_size = 25
//! selection_mode = "single"
//!
//! [notifications]
//! max_notifications = 3
//! position = "bottom-right"
//!
//! [logging]
//! level = "debug"
//!
//! [[columns]]
//! key = "name"
//! title = "Producto"
//!
//! [[columns]]
//! key = "price"
//! title = "Precio"
//! kind = "currency"
//! ```

use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::format::FormatSettings;
use crate::notify::NotificationConfig;
use crate::table::{Column, ColumnKind, ColumnSet, FilterOption, FilterType, TableOptions};

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
}

impl LoggingConfig {
    /// The parsed level. Unknown names fall back to `info`.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.level).unwrap_or(LevelFilter::Info)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// A column declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default = "enabled")]
    pub sortable: bool,
    #[serde(default = "enabled")]
    pub filterable: bool,
    #[serde(default)]
    pub filter_type: Option<FilterType>,
    #[serde(default)]
    pub filter_options: Vec<FilterOption>,
}

fn enabled() -> bool {
    true
}

impl ColumnConfig {
    /// Build the table column.
    pub fn to_column(&self) -> Column {
        let mut column = Column::new(&self.key, &self.title)
            .kind(self.kind)
            .sortable(self.sortable)
            .filterable(self.filterable);
        if self.kind == ColumnKind::Date || self.kind == ColumnKind::DateTime {
            column = column.filter_type(FilterType::Date);
        }
        if let Some(filter_type) = self.filter_type {
            column = column.filter_type(filter_type);
        }
        if !self.filter_options.is_empty() {
            column = column.filter_options(self.filter_options.clone());
        }
        column
    }
}

/// Complete panel configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub format: FormatSettings,
    pub table: TableOptions,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
    /// Table columns; empty means the front-end decides.
    pub columns: Vec<ColumnConfig>,
}

impl PanelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: PanelConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        log::info!("Loading config from {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.page_size == 0 {
            return Err(ConfigError::invalid("table.page_size", "must be at least 1"));
        }
        if self.table.page_size_options.is_empty() {
            return Err(ConfigError::invalid("table.page_size_options", "must not be empty"));
        }
        if self.table.page_size_options.contains(&0) {
            return Err(ConfigError::invalid(
                "table.page_size_options",
                "page sizes must be at least 1",
            ));
        }
        if self.table.page_window == 0 {
            return Err(ConfigError::invalid("table.page_window", "must be at least 1"));
        }
        if self.notifications.max_notifications == 0 {
            return Err(ConfigError::invalid(
                "notifications.max_notifications",
                "must be at least 1",
            ));
        }
        if LevelFilter::from_str(&self.logging.level).is_err() {
            return Err(ConfigError::invalid(
                "logging.level",
                format!("unknown level '{}'", self.logging.level),
            ));
        }
        self.column_set()?;
        Ok(())
    }

    /// The configured columns as table columns.
    pub fn table_columns(&self) -> Vec<Column> {
        self.columns.iter().map(ColumnConfig::to_column).collect()
    }

    /// The configured columns, checked for duplicate keys.
    pub fn column_set(&self) -> Result<ColumnSet, ConfigError> {
        Ok(ColumnSet::new(self.table_columns())?)
    }
}
