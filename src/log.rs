use crate::locations::get_log_dir;
use chrono::Utc;
use std::io::{Error, ErrorKind, Result};
use std::path::{Path, PathBuf};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, Registry};

/// Logs go to a file, the terminal belongs to the game.
pub(crate) fn init_logging(debug: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_file = get_log_location()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let formatter = BunyanFormattingLayer::new("virus_hunt".into(), non_blocking);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatter);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::new(ErrorKind::Other, e))?;

    Ok(guard)
}

fn get_log_location() -> Result<PathBuf> {
    let log_dir = get_log_dir()?;
    let timestamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let log_file = log_dir.join(format!("virus_hunt-{}.log", timestamp));
    clean_logfiles(&log_dir)?;
    Ok(log_file)
}

fn clean_logfiles(log_dir: &Path) -> Result<()> {
    // Logfiles from more than 30 days ago are deleted
    for file in std::fs::read_dir(log_dir)? {
        let file = file?;
        let modified = file.metadata()?.modified()?;
        let modified: chrono::DateTime<Utc> = chrono::DateTime::from(modified);
        let duration = Utc::now().signed_duration_since(modified);
        if duration.num_days() > 30 {
            std::fs::remove_file(file.path())?;
        }
    }
    Ok(())
}
