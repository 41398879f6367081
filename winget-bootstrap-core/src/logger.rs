//! Installation log file
//!
//! One file per run in the staging directory, holding every step record,
//! every warning and a closing summary, so a failed run can be reviewed after
//! the console window is gone.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::outcome::{InstallationOutcome, RunReport, StepRecord};

const LOG_PREFIX: &str = "winget-bootstrap-";
const LOG_SUFFIX: &str = ".log";

/// Appends run records to `winget-bootstrap-<timestamp>.log`
#[derive(Clone)]
pub struct InstallLogger {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl InstallLogger {
    /// Open a new timestamped log inside `dir`
    pub fn new(dir: &Path) -> Result<Self, String> {
        let now = chrono::Local::now();
        let path = dir.join(format!(
            "{}{}{}",
            LOG_PREFIX,
            now.format("%Y%m%d_%H%M%S"),
            LOG_SUFFIX
        ));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;

        let logger = Self {
            file: Arc::new(Mutex::new(file)),
            path,
        };
        logger.write_line(&format!(
            "winget-bootstrap {} run started {}",
            env!("CARGO_PKG_VERSION"),
            now.format("%Y-%m-%d %H:%M:%S")
        ));
        logger.write_line(&format!("staging: {}", dir.display()));

        Ok(logger)
    }

    pub fn log_path(&self) -> &Path {
        &self.path
    }

    /// One line per step; a failure reason follows on indented lines
    pub fn log_record(&self, record: &StepRecord) {
        let status = match &record.outcome {
            InstallationOutcome::Success => "ok",
            InstallationOutcome::AlreadySatisfied => "skipped",
            InstallationOutcome::Failed(_) => "FAILED",
        };
        self.write_line(&format!(
            "{} [{}] {}: {}",
            Self::clock(),
            record.stage,
            record.subject,
            status
        ));

        if let Some(error) = record.outcome.failure() {
            // PowerShell errors span several lines
            for line in error.to_string().lines() {
                self.write_line(&format!("    {}", line));
            }
        }
    }

    pub fn log_warning(&self, message: &str) {
        self.write_line(&format!("{} [warning] {}", Self::clock(), message));
    }

    /// Closing summary: counts, missing files, terminal state
    pub fn log_summary(&self, report: &RunReport) {
        self.write_line(&format!(
            "{} steps, {} failed, {} warnings",
            report.records.len(),
            report.failure_count(),
            report.warnings.len()
        ));
        if !report.missing.is_empty() {
            self.write_line(&format!("missing: {}", report.missing.join(", ")));
        }
        match report.terminal {
            Some(terminal) => self.write_line(&format!("finished: {:?}", terminal)),
            None => self.write_line("halted before completion"),
        }
    }

    /// Delete all but the newest `keep` logs in `dir`.
    ///
    /// The timestamp in the name sorts chronologically.
    pub fn prune(dir: &Path, keep: usize) -> Result<usize, String> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| format!("cannot read {}: {}", dir.display(), e))?;

        let mut logs: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX))
            .collect();
        logs.sort_unstable_by(|a, b| b.cmp(a));

        let mut removed = 0;
        for name in logs.iter().skip(keep) {
            match std::fs::remove_file(dir.join(name)) {
                Ok(()) => removed += 1,
                Err(e) => log::debug!("could not remove old log {}: {}", name, e),
            }
        }
        Ok(removed)
    }

    fn clock() -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            if let Err(e) = writeln!(file, "{}", line) {
                log::debug!("log write to {} failed: {}", self.path.display(), e);
            }
        }
    }
}
