//! CSV export of the filtered, sorted table.

use chrono::NaiveDate;

use super::state::DataTable;

/// Escape one CSV field.
///
/// Fields containing a comma, a quote, CR or LF are wrapped in quotes with
/// inner quotes doubled; anything else is returned as is.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Conventional file name for an export made on `date`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_export_{}.csv", prefix, date.format("%Y-%m-%d"))
}

impl DataTable {
    /// Export every row passing search and filters, in sorted order.
    ///
    /// Pagination is ignored and `actions` columns are skipped. The header
    /// holds column titles and each field the displayed cell text. Records
    /// end with `\n`.
    pub fn export_csv(&self) -> String {
        let columns: Vec<_> = self.columns().data_columns().collect();
        let mut out = String::new();

        let header: Vec<String> = columns.iter().map(|c| escape_field(&c.title)).collect();
        out.push_str(&header.join(","));
        out.push('\n');

        let rows = self.filtered_rows();
        for row in &rows {
            let fields: Vec<String> = columns
                .iter()
                .map(|col| escape_field(&self.display_value(row, col)))
                .collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        log::debug!("Exported {} rows as CSV", rows.len());
        out
    }
}
