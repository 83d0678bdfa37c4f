//! REPL state: one table, one notification queue.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use minimarket_lib::notify::{DismissReason, NotificationEvent, NotificationUpdate};
use minimarket_lib::table::{Column, RowAction, TableEvent, export_file_name};
use minimarket_lib::{
    DataTable, Formatter, NotificationId, NotificationKind, NotificationQueue, NotificationSpec,
    PanelConfig, Row, RowId, Scheduler, Value,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::commands::{Command, HELP};
use crate::error::CliError;
use crate::render;

/// Work handed back to the REPL loop by callbacks.
#[derive(Debug)]
pub enum AppMessage {
    /// A delete was confirmed from a notification.
    RemoveRow(RowId),
    /// The notification queue changed.
    Notification(NotificationEvent),
}

/// Whether the loop keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    table: DataTable,
    queue: NotificationQueue,
    export_dir: PathBuf,
}

impl App {
    pub fn new(
        config: PanelConfig,
        scheduler: Arc<dyn Scheduler>,
        tx: UnboundedSender<AppMessage>,
        export_dir: PathBuf,
    ) -> Result<Self, CliError> {
        let queue = NotificationQueue::new(config.notifications.clone(), scheduler);

        let events = tx.clone();
        queue.subscribe(move |event| {
            let _ = events.send(AppMessage::Notification(event.clone()));
        });

        let mut columns = if config.columns.is_empty() {
            default_columns()
        } else {
            config.table_columns()
        };
        columns.push(actions_column(&queue, tx));

        let mut table = DataTable::new(columns)?
            .with_options(config.table.clone())
            .with_formatter(Formatter::new(config.format.clone()))
            .with_rows(sample_rows());
        table.subscribe(|event: &TableEvent| log::debug!("Table event: {:?}", event));

        Ok(Self {
            table,
            queue,
            export_dir,
        })
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn queue(&self) -> &NotificationQueue {
        &self.queue
    }

    /// Run one command, drawing its result to `out`.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow, CliError> {
        log::debug!("Executing {:?}", command);
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Show => {}
            Command::Load(path) => self.load(&path)?,
            Command::Search(term) => self.table.set_search_term(term),
            Command::Filter { column, value } => self.table.set_filter(&column, value),
            Command::ClearFilters => self.table.clear_filters(),
            Command::Sort(column) => self.table.set_sort(&column),
            Command::ClearSort => self.table.clear_sort(),
            Command::Page(request) => self.table.set_page(request),
            Command::Size(size) => self.table.set_page_size(size),
            Command::Select(id) => self.table.toggle_select(&id),
            Command::SelectAll => self.table.toggle_select_all(),
            Command::ClearSelection => self.table.clear_selection(),
            Command::Export(path) => {
                self.export(path)?;
                return self.show_notifications(out);
            }
            Command::Action { name, id } => {
                if !self.table.invoke_action(&name, &id) {
                    return Err(CliError::NoAction {
                        name,
                        id: id.to_string(),
                    });
                }
                return self.show_notifications(out);
            }
            Command::Notify { kind, message } => {
                self.queue.show(NotificationSpec::new(message).kind(kind));
                return self.show_notifications(out);
            }
            Command::Notifications => return self.show_notifications(out),
            Command::Dismiss(n) => {
                self.queue.remove(&self.nth(n)?);
                return self.show_notifications(out);
            }
            Command::Trigger { index, action } => {
                let id = self.nth(index)?;
                if !self.queue.trigger_action(&id, &action) {
                    writeln!(out, "La notificación #{} no tiene la acción '{}'", index, action)?;
                }
                return self.show_notifications(out);
            }
            Command::Click(n) => {
                self.queue.click(&self.nth(n)?);
                return self.show_notifications(out);
            }
            Command::Pause(n) => {
                if !self.queue.pause(&self.nth(n)?) {
                    writeln!(out, "La notificación #{} no tiene temporizador activo", n)?;
                }
                return self.show_notifications(out);
            }
            Command::Resume(n) => {
                self.queue.resume(&self.nth(n)?);
                return self.show_notifications(out);
            }
            Command::ClearNotifications => {
                self.queue.clear();
                return self.show_notifications(out);
            }
        }
        render::table(out, &self.table)?;
        Ok(Flow::Continue)
    }

    /// Handle work queued by callbacks. Returns whether anything was drawn.
    pub fn handle(&mut self, message: AppMessage, out: &mut impl Write) -> Result<bool, CliError> {
        match message {
            AppMessage::RemoveRow(id) => {
                if !self.table.remove_row(&id) {
                    return Ok(false);
                }
                self.queue.success(format!("Fila {} eliminada", id));
                render::table(out, &self.table)?;
                Ok(true)
            }
            AppMessage::Notification(NotificationEvent::Removed {
                reason: DismissReason::Timer,
                ..
            }) => {
                writeln!(out)?;
                self.draw_notifications(out)?;
                Ok(true)
            }
            AppMessage::Notification(event) => {
                log::trace!("Notification event: {:?}", event);
                Ok(false)
            }
        }
    }

    fn draw_notifications(&self, out: &mut impl Write) -> std::io::Result<()> {
        render::notifications(
            out,
            &self.queue.snapshot(),
            self.queue.config(),
            render::terminal_width(),
        )
    }

    fn show_notifications(&self, out: &mut impl Write) -> Result<Flow, CliError> {
        self.draw_notifications(out)?;
        Ok(Flow::Continue)
    }

    /// Id of the `n`th queued notification, 1-based.
    fn nth(&self, n: usize) -> Result<NotificationId, CliError> {
        n.checked_sub(1)
            .and_then(|i| self.queue.snapshot().into_iter().nth(i))
            .map(|view| view.notification.id)
            .ok_or(CliError::NoNotification(n))
    }

    fn load(&mut self, path: &Path) -> Result<(), CliError> {
        let loading = self.queue.loading(format!("Leyendo {}", path.display()));
        self.table.set_loading(true);

        let rows = read_rows(path);
        self.table.set_loading(false);
        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => {
                self.queue.remove(&loading);
                return Err(e);
            }
        };

        let count = rows.len();
        self.table.set_data(rows);
        self.queue.update(
            &loading,
            NotificationUpdate::new()
                .kind(NotificationKind::Success)
                .title("Datos cargados")
                .message(format!("{} filas", count))
                .persistent(false)
                .duration(self.queue.config().default_duration()),
        );
        log::info!("Loaded {} rows from {}", count, path.display());
        Ok(())
    }

    fn export(&self, path: Option<PathBuf>) -> Result<(), CliError> {
        let path = match path {
            Some(path) => path,
            None => {
                let name = export_file_name("productos", chrono::Local::now().date_naive());
                fs::create_dir_all(&self.export_dir)?;
                self.export_dir.join(name)
            }
        };
        fs::write(&path, self.table.export_csv())?;
        log::info!("Exported CSV to {}", path.display());
        self.queue.success(format!("Exportado a {}", path.display()));
        Ok(())
    }
}

/// Parse a JSON array of objects into rows.
fn read_rows(path: &Path) -> Result<Vec<Row>, CliError> {
    let source = fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&source).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let serde_json::Value::Array(items) = json else {
        return Err(CliError::NotRows {
            path: path.to_path_buf(),
        });
    };
    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Object(map) => Ok(Row::from(map)),
            _ => Err(CliError::NotRows {
                path: path.to_path_buf(),
            }),
        })
        .collect()
}

fn display_name(row: &Row, id: &RowId) -> String {
    row.get("name")
        .map(ToString::to_string)
        .unwrap_or_else(|| id.to_string())
}

/// Edit reports through a notification; delete asks for confirmation and
/// hands the removal back to the REPL loop.
fn actions_column(queue: &NotificationQueue, tx: UnboundedSender<AppMessage>) -> Column {
    let edit_queue = queue.clone();
    let delete_queue = queue.clone();
    Column::actions(
        "actions",
        "Acciones",
        vec![
            RowAction::new("edit", "Editar").handler(move |row, id| {
                edit_queue.info(format!("Editando {}", display_name(row, id)));
            }),
            RowAction::new("delete", "Eliminar")
                .style("danger")
                .handler(move |row, id| {
                    let tx = tx.clone();
                    let id = id.clone();
                    delete_queue.confirm_action(
                        format!("¿Eliminar {}?", display_name(row, &id)),
                        move |_| {
                            let _ = tx.send(AppMessage::RemoveRow(id.clone()));
                        },
                    );
                }),
        ],
    )
}

fn default_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Producto"),
        Column::new("category", "Categoría"),
        Column::new("price", "Precio").currency(),
        Column::new("stock", "Stock"),
        Column::new("status", "Estado").badge(Some(Arc::new(|value: &Value| {
            match value.to_string().as_str() {
                "Agotado" => "danger",
                "Bajo" => "warning",
                _ => "success",
            }
            .to_string()
        }))),
        Column::new("updated", "Actualizado").date(),
    ]
}

fn sample_rows() -> Vec<Row> {
    let products: [(i64, &str, &str, f64, i64, (i32, u32, u32)); 12] = [
        (1, "Arroz Costeño 5kg", "Abarrotes", 24.9, 40, (2024, 3, 1)),
        (2, "Leche Gloria 400g", "Lácteos", 4.2, 120, (2024, 3, 2)),
        (3, "Azúcar rubia 1kg", "Abarrotes", 4.5, 6, (2024, 2, 28)),
        (4, "Aceite Primor 1L", "Abarrotes", 10.9, 0, (2024, 2, 20)),
        (5, "Inca Kola 1.5L", "Bebidas", 7.5, 48, (2024, 3, 3)),
        (6, "Coca-Cola 1.5L", "Bebidas", 7.5, 36, (2024, 3, 3)),
        (7, "Pan francés", "Panadería", 0.3, 200, (2024, 3, 4)),
        (8, "Yogurt Laive 1L", "Lácteos", 6.8, 8, (2024, 3, 1)),
        (9, "Atún Florida", "Conservas", 5.9, 64, (2024, 2, 15)),
        (10, "Fideos Don Vittorio", "Abarrotes", 3.6, 0, (2024, 2, 10)),
        (11, "Agua San Mateo 2.5L", "Bebidas", 3.2, 90, (2024, 3, 4)),
        (12, "Mantequilla Gloria", "Lácteos", 8.9, 15, (2024, 3, 2)),
    ];

    products
        .into_iter()
        .map(|(id, name, category, price, stock, (y, m, d))| {
            let status = match stock {
                0 => "Agotado",
                1..=10 => "Bajo",
                _ => "Disponible",
            };
            let mut row = Row::new()
                .set("id", id)
                .set("name", name)
                .set("category", category)
                .set("price", price)
                .set("stock", stock)
                .set("status", status);
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                row.insert("updated", date);
            }
            row
        })
        .collect()
}
