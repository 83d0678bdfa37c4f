//! REPL command parsing.

use std::path::PathBuf;
use std::str::FromStr;

use minimarket_lib::{NotificationKind, PageRequest, RowId};

use crate::error::CliError;

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Help,
    Quit,
    Load(PathBuf),
    Search(String),
    Filter { column: String, value: String },
    ClearFilters,
    Sort(String),
    ClearSort,
    Page(PageRequest),
    Size(usize),
    Select(RowId),
    SelectAll,
    ClearSelection,
    Export(Option<PathBuf>),
    Action { name: String, id: RowId },
    Notify { kind: NotificationKind, message: String },
    Notifications,
    Dismiss(usize),
    Trigger { index: usize, action: String },
    Click(usize),
    Pause(usize),
    Resume(usize),
    ClearNotifications,
}

pub const HELP: &str = "\
Tabla
  show                      redibujar la tabla
  load <archivo.json>       cargar filas desde un arreglo JSON
  search [texto]            buscar en columnas filtrables (vacío limpia)
  filter <columna> [valor]  filtrar una columna (sin valor limpia)
  filters-clear             quitar todos los filtros
  sort <columna>            ordenar (repetir invierte la dirección)
  sort-clear                quitar el orden
  page <n|next|prev>        cambiar de página
  size <n>                  filas por página
  select <id>               marcar o desmarcar una fila
  select-all                marcar o desmarcar la página
  select-clear              limpiar la selección
  export [archivo.csv]      exportar las filas filtradas
  action <nombre> <id>      ejecutar una acción de fila
Notificaciones
  notify <success|error|warning|info> <mensaje>
  notifications             listar notificaciones
  dismiss <n>               cerrar la notificación n
  trigger <n> <acción>      ejecutar una acción (confirm, cancel, ...)
  click <n>                 hacer clic en la notificación n
  pause <n> / resume <n>    pausar o reanudar su temporizador
  notifications-clear       cerrar todas
  help / quit";

fn split_word(input: &str) -> (&str, &str) {
    match input.trim().split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input.trim(), ""),
    }
}

fn index(arg: &str, usage: &'static str) -> Result<usize, CliError> {
    arg.parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(CliError::Usage(usage))
}

fn kind(arg: &str) -> Option<NotificationKind> {
    match arg {
        "success" => Some(NotificationKind::Success),
        "error" => Some(NotificationKind::Error),
        "warning" => Some(NotificationKind::Warning),
        "info" => Some(NotificationKind::Info),
        _ => None,
    }
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = split_word(line);
        let command = match word {
            "" | "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "load" if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
            "load" => return Err(CliError::Usage("load <archivo.json>")),
            "search" => Command::Search(rest.to_string()),
            "filter" => {
                let (column, value) = split_word(rest);
                if column.is_empty() {
                    return Err(CliError::Usage("filter <columna> [valor]"));
                }
                Command::Filter {
                    column: column.to_string(),
                    value: value.to_string(),
                }
            }
            "filters-clear" => Command::ClearFilters,
            "sort" if !rest.is_empty() => Command::Sort(rest.to_string()),
            "sort" => return Err(CliError::Usage("sort <columna>")),
            "sort-clear" => Command::ClearSort,
            "page" => Command::Page(match rest {
                "next" | "n" => PageRequest::Next,
                "prev" | "p" => PageRequest::Prev,
                n => PageRequest::Number(index(n, "page <n|next|prev>")?),
            }),
            "size" => Command::Size(index(rest, "size <n>")?),
            "select" if !rest.is_empty() => Command::Select(RowId::parse(rest)),
            "select" => return Err(CliError::Usage("select <id>")),
            "select-all" => Command::SelectAll,
            "select-clear" => Command::ClearSelection,
            "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "action" => {
                let (name, id) = split_word(rest);
                if name.is_empty() || id.is_empty() {
                    return Err(CliError::Usage("action <nombre> <id>"));
                }
                Command::Action {
                    name: name.to_string(),
                    id: RowId::parse(id),
                }
            }
            "notify" => {
                const USAGE: &str = "notify <success|error|warning|info> <mensaje>";
                let (k, message) = split_word(rest);
                let kind = kind(k).ok_or(CliError::Usage(USAGE))?;
                if message.is_empty() {
                    return Err(CliError::Usage(USAGE));
                }
                Command::Notify {
                    kind,
                    message: message.to_string(),
                }
            }
            "notifications" => Command::Notifications,
            "dismiss" => Command::Dismiss(index(rest, "dismiss <n>")?),
            "trigger" => {
                const USAGE: &str = "trigger <n> <acción>";
                let (n, action) = split_word(rest);
                if action.is_empty() {
                    return Err(CliError::Usage(USAGE));
                }
                Command::Trigger {
                    index: index(n, USAGE)?,
                    action: action.to_string(),
                }
            }
            "click" => Command::Click(index(rest, "click <n>")?),
            "pause" => Command::Pause(index(rest, "pause <n>")?),
            "resume" => Command::Resume(index(rest, "resume <n>")?),
            "notifications-clear" => Command::ClearNotifications,
            other => return Err(CliError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}
