mod app;
mod commands;
mod error;
mod paths;
mod render;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use minimarket_lib::{PanelConfig, TokioScheduler};
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::app::{App, Flow};
use crate::commands::Command;
use crate::error::CliError;
use crate::paths::AppDirs;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Start logging to a fresh `latest.log`.
fn init_logging(dirs: &AppDirs, level: LevelFilter) -> Result<(), CliError> {
    let path = dirs.prepare_log_file()?;
    let log_file = File::create(&path)?;
    WriteLogger::init(level, Config::default(), log_file)?;
    Ok(())
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "minimarket> ")?;
    out.flush()
}

async fn run() -> Result<(), CliError> {
    let dirs = AppDirs::discover();

    // Explicit path first, then the platform config file.
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs.config_file());
    let config = PanelConfig::load(&config_path)?;

    init_logging(&dirs, config.logging.level_filter())?;
    log::info!("Starting with config {}", config_path.display());

    let scheduler = Arc::new(TokioScheduler::from_current()?);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(config, scheduler, tx, dirs.export_dir().to_path_buf())?;

    let mut stdout = io::stdout();
    app.execute(Command::Show, &mut stdout)?;
    writeln!(stdout, "Escribe 'help' para ver los comandos.")?;
    prompt(&mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let result = line
                    .parse::<Command>()
                    .and_then(|command| app.execute(command, &mut stdout));
                match result {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => {
                        log::warn!("{}", e);
                        writeln!(stdout, "{}", e)?;
                    }
                }
                prompt(&mut stdout)?;
            }
            Some(message) = rx.recv() => {
                if app.handle(message, &mut stdout)? {
                    prompt(&mut stdout)?;
                }
            }
        }
    }

    app.queue().clear();
    log::info!("Exiting");
    Ok(())
}
