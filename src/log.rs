use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, Registry};

const LOG_RETENTION_DAYS: i64 = 30;

/// Install the global subscriber. Logs go to a fresh bunyan-formatted file in
/// `log_dir`; keep the returned guard alive or buffered lines are lost.
pub fn init_logging(log_dir: &Path, debug: bool) -> io::Result<WorkerGuard> {
    let log_file = get_log_location(log_dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let formatter = BunyanFormattingLayer::new("yanta_tree".into(), non_blocking);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatter);
    // warp and hyper still log through the `log` facade
    tracing_log::LogTracer::init().map_err(io::Error::other)?;
    tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)?;

    Ok(guard)
}

fn get_log_location(log_dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let timestamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let log_file = log_dir.join(format!("yanta-{}.log", timestamp));
    clean_logfiles(log_dir)?;
    Ok(log_file)
}

fn clean_logfiles(log_dir: &Path) -> io::Result<()> {
    for file in std::fs::read_dir(log_dir)? {
        let file = file?;
        let modified = file.metadata()?.modified()?;
        let modified: chrono::DateTime<Utc> = chrono::DateTime::from(modified);
        let age = Utc::now().signed_duration_since(modified);
        if age.num_days() > LOG_RETENTION_DAYS {
            std::fs::remove_file(file.path())?;
        }
    }
    Ok(())
}
