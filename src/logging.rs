use std::{
    fs::{self, DirEntry},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, ensure};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, RollingFileAppender},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::{Directive, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "wurzel.log";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const LEDGER_TARGET: &str = "ledger";
const LEDGER_DEFAULT_DIRECTIVE: &str = "ledger=debug";

/// Keeps the background log writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _worker_guard: WorkerGuard,
    run_id: String,
}

impl LoggingGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

#[derive(Debug, Default)]
struct RetentionSweep {
    removed: usize,
    warnings: Vec<String>,
}

pub fn init_tracing(logging_config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = prepare_log_dir(logging_config)?;
    let sweep = sweep_expired_logs(
        &log_dir,
        LOG_FILE_PREFIX,
        logging_config.retention_days,
        SystemTime::now(),
    );
    let env_filter = build_env_filter(&logging_config.filter)?;
    let (file_writer, worker_guard) =
        tracing_appender::non_blocking(rolling_appender(&log_dir, &logging_config.rotation));

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(env_filter);

    let stderr_layer = logging_config.stderr_warn_enabled.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        dir = %log_dir.display(),
        filter = %logging_config.filter,
        rotation = ?logging_config.rotation,
        retention_days = logging_config.retention_days,
        expired_files_removed = sweep.removed,
        ledger_defaulted = !names_target(&logging_config.filter, LEDGER_TARGET),
        "logging_initialized"
    );
    for warning in sweep.warnings {
        tracing::warn!(target: "logging", warning = %warning, "logging_retention_warning");
    }

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
        run_id,
    })
}

/// Parses `logging.filter` and caps the ledger at `debug` unless the filter names it.
///
/// The ledger emits one `trace` event per reservation.
fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    let env_filter = EnvFilter::try_new(filter)
        .with_context(|| format!("failed to parse logging.filter '{filter}'"))?;
    if names_target(filter, LEDGER_TARGET) {
        return Ok(env_filter);
    }
    let ledger_default: Directive = LEDGER_DEFAULT_DIRECTIVE
        .parse()
        .context("failed to parse default ledger directive")?;
    Ok(env_filter.add_directive(ledger_default))
}

fn names_target(filter: &str, target: &str) -> bool {
    filter.split(',').any(|directive| {
        let name = directive
            .trim()
            .split(['=', '['])
            .next()
            .unwrap_or_default();
        name == target
            || name
                .strip_prefix(target)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

fn rolling_appender(log_dir: &Path, rotation: &LoggingRotation) -> RollingFileAppender {
    match rotation {
        LoggingRotation::Daily => rolling::daily(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(log_dir, LOG_FILE_PREFIX),
    }
}

fn prepare_log_dir(logging_config: &LoggingConfig) -> Result<PathBuf> {
    ensure!(
        !logging_config.filter.trim().is_empty(),
        "logging.filter cannot be empty"
    );
    ensure!(
        !logging_config.dir.as_os_str().is_empty(),
        "logging.dir cannot be empty"
    );

    let log_dir = absolute_log_dir(&logging_config.dir)?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create logging directory {}", log_dir.display()))?;
    Ok(log_dir)
}

fn absolute_log_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }

    let cwd = std::env::current_dir()
        .context("failed to read current working directory for logging.dir resolution")?;
    Ok(cwd.join(dir))
}

struct RotatedLogFile {
    path: PathBuf,
    modified: SystemTime,
}

/// Lists regular files in `log_dir` written by the rolling appender.
///
/// Entries that cannot be inspected come back as warnings.
fn rotated_log_files(
    log_dir: &Path,
    prefix: &str,
) -> Result<Vec<Result<RotatedLogFile, String>>, String> {
    let entries = fs::read_dir(log_dir).map_err(|err| {
        format!(
            "failed to scan logging directory {}: {err}",
            log_dir.display()
        )
    })?;

    let files = entries
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_name().to_string_lossy().starts_with(prefix) => {
                inspect(&entry).transpose()
            }
            Ok(_) => None,
            Err(err) => Some(Err(format!(
                "failed to iterate logging directory entries: {err}"
            ))),
        })
        .collect();
    Ok(files)
}

fn inspect(entry: &DirEntry) -> Result<Option<RotatedLogFile>, String> {
    let path = entry.path();
    let metadata = entry
        .metadata()
        .map_err(|err| format!("failed to stat {}: {err}", path.display()))?;
    if !metadata.is_file() {
        return Ok(None);
    }
    let modified = metadata
        .modified()
        .map_err(|err| format!("failed to read mtime for {}: {err}", path.display()))?;
    Ok(Some(RotatedLogFile { path, modified }))
}

/// Deletes rotated log files whose mtime is older than the retention window.
fn sweep_expired_logs(
    log_dir: &Path,
    prefix: &str,
    retention_days: usize,
    now: SystemTime,
) -> RetentionSweep {
    let retention = Duration::from_secs((retention_days as u64).saturating_mul(SECONDS_PER_DAY));
    let cutoff = now.checked_sub(retention).unwrap_or(SystemTime::UNIX_EPOCH);
    let mut sweep = RetentionSweep::default();

    let files = match rotated_log_files(log_dir, prefix) {
        Ok(files) => files,
        Err(warning) => {
            sweep.warnings.push(warning);
            return sweep;
        }
    };

    for file in files {
        match file {
            Ok(file) if file.modified > cutoff => {}
            Ok(file) => match fs::remove_file(&file.path) {
                Ok(()) => sweep.removed += 1,
                Err(err) => sweep.warnings.push(format!(
                    "failed to remove expired log file {}: {err}",
                    file.path.display()
                )),
            },
            Err(warning) => sweep.warnings.push(warning),
        }
    }

    sweep
}
