//! Observability: tracing init and the JSONL launch audit log.
//!
//! Uses config::ObservabilityConfig for G1LAUNCH_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static AUDIT_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Initialize tracing. Call once at process startup.
/// In quiet mode only WARN and above are logged; `RUST_LOG` wins over the config.
pub fn init_tracing(cfg: &ObservabilityConfig) {
    let level = if cfg.quiet {
        "g1launch=warn".to_string()
    } else {
        cfg.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let file = cfg.log_file.as_deref().and_then(open_log_file);

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(file.map(|f| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(Mutex::new(f))
            }))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .with(file.map(|f| {
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(f))
            }))
            .try_init()
    };

    if let Some(ref path) = cfg.audit_log {
        set_audit_path(Path::new(path));
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Route audit records to `path` (parent directories are created).
pub fn set_audit_path(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(mut guard) = AUDIT_PATH.lock() {
        *guard = Some(path.to_path_buf());
    }
}

fn get_audit_path() -> Option<PathBuf> {
    AUDIT_PATH.lock().ok()?.clone()
}

/// One line of the audit log
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    EnvironmentActivated {
        env_dir: String,
    },
    DependenciesInstalled {
        manifest: String,
        packages: usize,
        exit_code: i32,
        skipped: bool,
    },
    ApplicationStarted {
        program: String,
        args: Vec<String>,
        attempt: u32,
    },
    ApplicationExited {
        exit_code: i32,
        duration_ms: u64,
        attempt: u32,
    },
}

#[derive(Serialize)]
struct AuditRecord<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a AuditEvent,
}

/// Format an event as a single JSON line (no trailing newline)
pub fn audit_line(event: &AuditEvent) -> Option<String> {
    let record = AuditRecord {
        ts: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        event,
    };
    serde_json::to_string(&record).ok()
}

/// Append an event to the audit log; no-op when no audit path is configured
pub fn audit(event: AuditEvent) {
    if let Some(path) = get_audit_path() {
        append_jsonl(&path, &event);
    }
}

fn append_jsonl(path: &Path, event: &AuditEvent) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Some(line) = audit_line(event) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_line_shape() {
        let line = audit_line(&AuditEvent::ApplicationExited {
            exit_code: 1,
            duration_ms: 42,
            attempt: 0,
        })
        .unwrap();
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["event"], "application_exited");
        assert_eq!(v["exit_code"], 1);
        assert_eq!(v["duration_ms"], 42);
        assert!(v["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_append_jsonl_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("audit").join("launch.jsonl");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let event = AuditEvent::EnvironmentActivated {
            env_dir: "/opt/app/venv".into(),
        };
        append_jsonl(&path, &event);
        append_jsonl(&path, &event);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"environment_activated\""));
    }
}
