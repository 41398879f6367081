//! Step outcomes, the failure taxonomy and the run report

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::os_profile::InstallBranch;

/// Every way a step can fail. Each variant names the artifact or step involved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum StepError {
    #[error("Failed to create staging directory {}: {reason}", .path.display())]
    DirectoryCreationFailure { path: PathBuf, reason: String },

    #[error("Failed to download {name}: {reason}")]
    TransferFailure { name: String, reason: String },

    #[error("Failed to extract {archive}: {reason}")]
    ExtractionFailure { archive: String, reason: String },

    #[error("Failed to copy {name} from the extracted archive: {reason}")]
    CopyFailure { name: String, reason: String },

    #[error("Missing required files: {}", .names.join(", "))]
    MissingArtifact { names: Vec<String> },

    #[error("Failed to install package {name}: {reason}")]
    PackageInstallFailure { name: String, reason: String },

    #[error("Failed to provision package {name} for all users: {reason}")]
    ProvisioningFailure { name: String, reason: String },

    #[error("Failed to install the secondary package manager: {reason}")]
    SecondaryManagerBootstrapFailure { reason: String },

    #[error("{command} is not available on PATH: {reason}")]
    VerificationFailure { command: String, reason: String },
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InstallationOutcome {
    Success,
    AlreadySatisfied,
    Failed(StepError),
}

impl InstallationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, InstallationOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&StepError> {
        match self {
            InstallationOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Pipeline stage a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Prepare,
    Fetch,
    Expand,
    Completeness,
    RuntimeLibraries,
    PackageManager,
    SecondaryManager,
    Verification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Prepare => "prepare",
            Stage::Fetch => "fetch",
            Stage::Expand => "expand",
            Stage::Completeness => "completeness",
            Stage::RuntimeLibraries => "runtime-libraries",
            Stage::PackageManager => "package-manager",
            Stage::SecondaryManager => "secondary-manager",
            Stage::Verification => "verification",
        };
        f.write_str(name)
    }
}

/// One attempted step and how it went
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub stage: Stage,
    pub subject: String,
    pub outcome: InstallationOutcome,
}

/// How a completed run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Terminal {
    Done,
    DoneWithWarnings,
}

/// Summary of a run, complete or halted
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub records: Vec<StepRecord>,
    pub warnings: Vec<String>,
    /// Names the completeness check found missing
    pub missing: Vec<String>,
    /// Installation branch chosen for the package manager, once known
    pub branch: Option<InstallBranch>,
    /// Set only when the sequencer reached its terminal state
    pub terminal: Option<Terminal>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Failures recorded during one stage
    pub fn failures_in(&self, stage: Stage) -> usize {
        self.failures().filter(|r| r.stage == stage).count()
    }

    pub fn records_in(&self, stage: Stage) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(move |r| r.stage == stage)
    }
}

/// A fail-fast run stopped at its first failure
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Halted {
    pub error: StepError,
    pub report: RunReport,
}
