//! Run-wide state threaded through every stage
//!
//! Stages never decide on their own whether a failure stops the run. They hand
//! each outcome to [`InstallContext::record`], which applies the failure policy.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::logger::InstallLogger;
use crate::outcome::{InstallationOutcome, RunReport, Stage, StepError, StepRecord, Terminal};
use crate::platform::Operator;
use crate::progress::ProgressReporter;

/// What happens after a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FailurePolicy {
    /// Stop at the first failure
    #[default]
    FailFast,
    /// Report, wait for the operator, carry on with the next step
    BestEffort,
}

pub struct InstallContext<'a> {
    staging_dir: PathBuf,
    policy: FailurePolicy,
    operator: &'a dyn Operator,
    progress: ProgressReporter,
    logger: Option<InstallLogger>,
    report: RunReport,
}

impl<'a> InstallContext<'a> {
    pub fn new(staging_dir: &Path, policy: FailurePolicy, operator: &'a dyn Operator) -> Self {
        Self {
            staging_dir: staging_dir.to_path_buf(),
            policy,
            operator,
            progress: ProgressReporter::console(),
            logger: None,
            report: RunReport::default(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn set_logger(&mut self, logger: InstallLogger) {
        self.logger = Some(logger);
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Path of a file directly inside the staging directory
    pub fn staged(&self, name: &str) -> PathBuf {
        self.staging_dir.join(name)
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut RunReport {
        &mut self.report
    }

    /// Record a step outcome.
    ///
    /// Returns `Err` only when the step failed under [`FailurePolicy::FailFast`].
    pub fn record(
        &mut self,
        stage: Stage,
        subject: impl Into<String>,
        outcome: InstallationOutcome,
    ) -> Result<(), StepError> {
        let failure = outcome.failure().cloned();
        self.push_record(stage, subject.into(), outcome);

        match (failure, self.policy) {
            (None, _) => Ok(()),
            (Some(e), FailurePolicy::FailFast) => Err(e),
            (Some(e), FailurePolicy::BestEffort) => {
                self.operator.acknowledge(&e.to_string());
                Ok(())
            }
        }
    }

    /// Record a failure that ends the run under either policy.
    ///
    /// The operator is not asked to continue.
    pub fn record_fatal(
        &mut self,
        stage: Stage,
        subject: impl Into<String>,
        error: StepError,
    ) -> StepError {
        self.push_record(
            stage,
            subject.into(),
            InstallationOutcome::Failed(error.clone()),
        );
        error
    }

    fn push_record(&mut self, stage: Stage, subject: String, outcome: InstallationOutcome) {
        match &outcome {
            InstallationOutcome::Success => log::info!("[{}] {}: done", stage, subject),
            InstallationOutcome::AlreadySatisfied => {
                log::info!("[{}] {}: already satisfied", stage, subject)
            }
            InstallationOutcome::Failed(e) => eprintln!("ERROR: {}", e),
        }

        let record = StepRecord {
            stage,
            subject,
            outcome,
        };
        if let Some(logger) = &self.logger {
            logger.log_record(&record);
        }
        self.report.records.push(record);
    }

    /// Record a non-fatal warning
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        println!("WARNING: {}", message);
        if let Some(logger) = &self.logger {
            logger.log_warning(&message);
        }
        self.report.warnings.push(message);
    }

    /// Record a warning the operator has to acknowledge before the run continues
    pub fn advise(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.warn(message.clone());
        self.operator.acknowledge(&message);
    }

    /// Terminal state implied by what has been recorded so far
    pub fn terminal(&self) -> Terminal {
        if self.report.failure_count() == 0 && self.report.warnings.is_empty() {
            Terminal::Done
        } else {
            Terminal::DoneWithWarnings
        }
    }

    pub fn into_report(self) -> RunReport {
        if let Some(logger) = &self.logger {
            logger.log_summary(&self.report);
        }
        self.report
    }
}
