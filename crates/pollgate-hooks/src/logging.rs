//! Tracing setup shared by the hook binaries.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

pub const DEFAULT_ERROR_LOG: &str = "./logs/error.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `POLLGATE_LOG` picks the level for our
/// own crates. `LOG_FORMAT=json` switches stderr output to JSON. Error events
/// are also appended to `POLLGATE_ERROR_LOG` unless it is set to an empty value.
pub fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(default_directives(std::env::var("POLLGATE_LOG").ok().as_deref()))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    let error_log = error_log_path(std::env::var("POLLGATE_ERROR_LOG").ok());
    let (error_file, open_failure) = match error_log.as_deref().map(open_error_log) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(error_file_layer(error_file));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(error_file_layer(error_file));
        let _ = subscriber.try_init();
    }

    if let (Some(path), Some(e)) = (error_log, open_failure) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Could not open error log, logging to stderr only"
        );
    }
}

fn error_file_layer<S>(file: Option<File>) -> Option<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::ERROR)
    })
}

fn default_directives(level: Option<&str>) -> String {
    let level = match level {
        Some("debug") => "debug",
        Some("warn") | Some("warning") => "warn",
        Some("error") => "error",
        _ => "info",
    };

    format!(
        "pollgate={level},pollgate_hooks={level},pre_deploy={level},post_deploy={level},aws_config=warn"
    )
}

/// Unset means the default path; an empty value disables the file.
fn error_log_path(raw: Option<String>) -> Option<PathBuf> {
    match raw {
        None => Some(PathBuf::from(DEFAULT_ERROR_LOG)),
        Some(value) if value.trim().is_empty() => None,
        Some(value) => Some(PathBuf::from(value)),
    }
}

fn open_error_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
