use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (e.g., "debug", "findings_bridge=trace")
    pub level: String,
    /// Optional log file path. If None, logs only to stderr
    pub file_path: Option<PathBuf>,
    /// Whether to use structured JSON format for logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from `RUST_LOG`, `BRIDGE_LOG_FILE`, `BRIDGE_LOG_UNIQUE`
    /// and `BRIDGE_LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let unique = env::var("BRIDGE_LOG_UNIQUE").unwrap_or_default() == "true";
        let file_path = env::var("BRIDGE_LOG_FILE").ok().map(|path| {
            let path = PathBuf::from(path);
            if unique {
                with_pid_suffix(path, std::process::id())
            } else {
                path
            }
        });
        let json_format = env::var("BRIDGE_LOG_JSON").unwrap_or_default() == "true";

        Self {
            level,
            file_path,
            json_format,
        }
    }

    /// Override values from CLI arguments
    pub fn with_overrides(mut self, level: Option<String>, file_path: Option<PathBuf>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(file_path) = file_path {
            self.file_path = Some(file_path);
        }
        self
    }
}

/// `bridge.log` -> `bridge.<pid>.log`, so concurrent sessions don't share a file
fn with_pid_suffix(mut path: PathBuf, pid: u32) -> PathBuf {
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
        return path;
    };
    let unique = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}.{}", stem, pid, ext),
        _ => format!("{}.{}", stem, pid),
    };
    path.set_file_name(unique);
    path
}

/// Initialize the logging system based on configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;
    let registry = tracing_subscriber::registry().with(env_filter);

    // Stdout carries the replay output, so logs go to stderr or a file.
    match config.file_path {
        Some(file_path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            if config.json_format {
                registry
                    .with(fmt::layer().json().with_writer(file).with_ansi(false))
                    .init();
            } else {
                registry
                    .with(
                        fmt::layer()
                            .with_writer(file)
                            .with_ansi(false)
                            .with_target(true)
                            .with_thread_ids(true),
                    )
                    .init();
            }
        }
        None => {
            if config.json_format {
                registry
                    .with(fmt::layer().json().with_writer(io::stderr).with_ansi(false))
                    .init();
            } else {
                registry
                    .with(
                        fmt::layer()
                            .with_writer(io::stderr)
                            .with_target(true)
                            .with_thread_ids(true),
                    )
                    .init();
            }
        }
    }

    Ok(())
}

/// Log one finding as a single structured event
#[macro_export]
macro_rules! log_finding {
    ($level:expr, $surface:expr, $finding:expr, $outcome:expr) => {
        tracing::event!(
            $level,
            surface = $surface,
            kind = ?$finding.kind,
            position = %$finding.position,
            severity = ?$finding.severity,
            outcome = $outcome,
            "Finding"
        )
    };
}
