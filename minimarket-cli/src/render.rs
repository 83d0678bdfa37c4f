//! Terminal rendering of table views and notification snapshots.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use minimarket_lib::DataTable;
use minimarket_lib::notify::{
    NotificationConfig, NotificationKind, NotificationPosition, NotificationView,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a column may get before cells are cut.
const MAX_COLUMN_WIDTH: usize = 28;

/// Cut `s` to `max_width` display columns, ending with an ellipsis.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target = max_width - 1;
    let mut out = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > target {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

/// Pad `s` with spaces to `width` display columns.
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

fn badge_color(class: &str) -> Color {
    match class {
        "success" => Color::Green,
        "danger" => Color::Red,
        "warning" => Color::Yellow,
        "secondary" => Color::DarkGrey,
        _ => Color::Blue,
    }
}

fn kind_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
        NotificationKind::Warning => Color::Yellow,
        NotificationKind::Info => Color::Cyan,
    }
}

/// Draw the current page of `table` with its pager.
pub fn table(out: &mut impl Write, table: &DataTable) -> io::Result<()> {
    let view = table.derive_view();
    let options = table.options();

    if view.loading {
        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print(&options.loading_message),
            ResetColor,
            Print("\n")
        )?;
        return out.flush();
    }

    let columns: Vec<_> = table.columns().data_columns().collect();
    let cells: Vec<Vec<_>> = view
        .rows
        .iter()
        .map(|r| columns.iter().map(|col| table.cell(r.row, col)).collect())
        .collect();

    let ids: Vec<String> = view.rows.iter().map(|r| r.id.to_string()).collect();
    let id_width = ids.iter().map(|id| id.width()).max().unwrap_or(0).max(2);

    let titles: Vec<String> = columns
        .iter()
        .map(|col| match &table.state().sort {
            Some(sort) if sort.column == col.key => format!("{} ({})", col.title, sort.direction),
            _ => col.title.clone(),
        })
        .collect();

    let widths: Vec<usize> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            cells
                .iter()
                .map(|row| row[i].text.width())
                .chain(std::iter::once(title.width()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    // Header
    queue!(out, SetAttribute(Attribute::Bold), Print("    "), Print(pad("id", id_width)))?;
    for (title, width) in titles.iter().zip(&widths) {
        queue!(out, Print("  "), Print(pad(&truncate_to_width(title, *width), *width)))?;
    }
    queue!(out, SetAttribute(Attribute::Reset), Print("\n"))?;

    if view.is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print(&options.empty_message),
            ResetColor,
            Print("\n")
        )?;
        return out.flush();
    }

    for ((row, cells), id) in view.rows.iter().zip(&cells).zip(&ids) {
        let mark = if row.selected { "[x] " } else { "[ ] " };
        queue!(out, Print(mark), Print(pad(id, id_width)))?;
        for (cell, width) in cells.iter().zip(&widths) {
            let text = pad(&truncate_to_width(&cell.text, *width), *width);
            match &cell.badge {
                Some(class) => queue!(
                    out,
                    Print("  "),
                    SetForegroundColor(badge_color(class)),
                    Print(text),
                    ResetColor
                )?,
                None => queue!(out, Print("  "), Print(text))?,
            }
        }
        queue!(out, Print("\n"))?;
    }

    // Pager
    let pages: Vec<String> = view
        .page_numbers(options.page_window)
        .into_iter()
        .map(|p| if p == view.current_page { format!("[{}]", p) } else { p.to_string() })
        .collect();
    queue!(
        out,
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "Mostrando {}-{} de {} · página {}/{}  {}",
            view.page_start,
            view.page_end,
            view.total_filtered,
            view.current_page,
            view.total_pages,
            pages.join(" ")
        )),
        ResetColor,
        Print("\n")
    )?;

    let selected = table.selected_ids().len();
    if selected > 0 {
        queue!(out, Print(format!("{} seleccionada(s)\n", selected)))?;
    }
    out.flush()
}

/// Cells of the remaining-time bar.
const PROGRESS_CELLS: usize = 10;

/// Terminal width, or 80 columns when stdout is not a terminal.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| usize::from(w))
        .unwrap_or(80)
}

/// Remaining-time bar for an entry with a running or paused timer.
fn progress_bar(view: &NotificationView) -> Option<String> {
    let left = view.remaining?;
    let total = view.notification.duration;
    if total.is_zero() {
        return None;
    }
    let ratio = (left.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0);
    let filled = (ratio * PROGRESS_CELLS as f64).round() as usize;
    Some(format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_CELLS - filled)
    ))
}

fn indent(position: NotificationPosition, line_width: usize, width: usize) -> usize {
    let spare = width.saturating_sub(line_width);
    match position {
        NotificationPosition::TopLeft | NotificationPosition::BottomLeft => 0,
        NotificationPosition::TopCenter | NotificationPosition::BottomCenter => spare / 2,
        NotificationPosition::TopRight | NotificationPosition::BottomRight => spare,
    }
}

/// Draw the queued notifications, numbered from 1, aligned to the
/// configured side of a `width`-column terminal.
pub fn notifications(
    out: &mut impl Write,
    views: &[NotificationView],
    config: &NotificationConfig,
    width: usize,
) -> io::Result<()> {
    if views.is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print("Sin notificaciones\n"),
            ResetColor
        )?;
        return out.flush();
    }

    for (i, view) in views.iter().enumerate() {
        let n = &view.notification;
        let number = format!("#{} ", i + 1);
        let title = n.title.as_deref().unwrap_or(n.kind.default_title());
        let mut body = format!(" {}", n.message);
        if let Some(left) = view.remaining {
            let state = if view.paused { "pausada, " } else { "" };
            body.push_str(&format!(" ({}{:.1}s)", state, left.as_secs_f64()));
        }
        let bar = if config.show_progress { progress_bar(view) } else { None };
        let actions: Vec<String> = n
            .actions
            .iter()
            .map(|a| format!(" [{}: {}]", a.name, a.label))
            .collect();

        let line_width = number.width()
            + title.width()
            + body.width()
            + bar.as_ref().map_or(0, |b| b.width() + 1)
            + actions.iter().map(|a| a.width()).sum::<usize>();

        queue!(
            out,
            Print(" ".repeat(indent(config.position, line_width, width))),
            Print(number),
            SetForegroundColor(kind_color(n.kind)),
            SetAttribute(Attribute::Bold),
            Print(title),
            SetAttribute(Attribute::Reset),
            ResetColor,
            Print(body)
        )?;
        if let Some(bar) = bar {
            queue!(
                out,
                Print(" "),
                SetForegroundColor(kind_color(n.kind)),
                Print(bar),
                ResetColor
            )?;
        }
        for (action, text) in n.actions.iter().zip(actions) {
            queue!(
                out,
                SetForegroundColor(badge_color(&action.style)),
                Print(text),
                ResetColor
            )?;
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use minimarket_lib::table::{Column, Row};
    use minimarket_lib::{ManualScheduler, NotificationQueue};

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_truncate_respects_wide_chars() {
        assert_eq!(truncate_to_width("Azúcar", 10), "Azúcar");
        assert_eq!(truncate_to_width("Azúcar rubia", 6), "Azúca…");
        assert_eq!(truncate_to_width("日本語", 4), "日…");
        assert_eq!(pad("ñ", 3), "ñ  ");
    }

    #[test]
    fn test_table_lists_rows_and_pager() {
        let mut data = DataTable::new(vec![
            Column::new("name", "Producto"),
            Column::new("price", "Precio").currency(),
        ])
        .unwrap();
        data.set_data(vec![
            Row::new().set("id", 1).set("name", "Arroz").set("price", 4.5),
            Row::new().set("id", 2).set("name", "Leche").set("price", 3.8),
        ]);

        let text = rendered(|out| table(out, &data));
        assert!(text.contains("Producto"));
        assert!(text.contains("Arroz"));
        assert!(text.contains("S/ 4.50"));
        assert!(text.contains("Mostrando 1-2 de 2"));
    }

    #[test]
    fn test_empty_table_shows_message() {
        let data = DataTable::new(vec![Column::new("name", "Producto")]).unwrap();
        let text = rendered(|out| table(out, &data));
        assert!(text.contains("No hay datos disponibles"));
    }

    #[test]
    fn test_no_notifications() {
        let config = NotificationConfig::default();
        let text = rendered(|out| notifications(out, &[], &config, 80));
        assert!(text.contains("Sin notificaciones"));
    }

    fn queued_view(config: NotificationConfig) -> Vec<NotificationView> {
        let scheduler = ManualScheduler::new();
        let queue = NotificationQueue::new(config, Arc::new(scheduler.clone()));
        queue.info("Stock actualizado");
        scheduler.advance(Duration::from_millis(2000));
        queue.snapshot()
    }

    #[test]
    fn test_progress_bar_tracks_remaining_time() {
        let config = NotificationConfig::default();
        let views = queued_view(config.clone());
        let text = rendered(|out| notifications(out, &views, &config, 80));
        assert!(text.contains("Stock actualizado (2.0s)"));
        assert!(text.contains("█████░░░░░"));
    }

    #[test]
    fn test_progress_bar_can_be_disabled() {
        let config = NotificationConfig {
            show_progress: false,
            ..NotificationConfig::default()
        };
        let views = queued_view(config.clone());
        let text = rendered(|out| notifications(out, &views, &config, 80));
        assert!(!text.contains('█'));
    }

    #[test]
    fn test_position_sets_alignment() {
        assert_eq!(indent(NotificationPosition::TopLeft, 30, 80), 0);
        assert_eq!(indent(NotificationPosition::BottomCenter, 30, 80), 25);
        assert_eq!(indent(NotificationPosition::TopRight, 30, 80), 50);
        assert_eq!(indent(NotificationPosition::TopRight, 100, 80), 0);

        let config = NotificationConfig {
            position: NotificationPosition::BottomLeft,
            ..NotificationConfig::default()
        };
        let views = queued_view(config.clone());
        let text = rendered(|out| notifications(out, &views, &config, 80));
        assert!(text.starts_with("#1 "));
    }
}
