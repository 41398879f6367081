use std::path::PathBuf;

mod archive;
mod completeness;
mod context;
mod fetch;
mod logger;
mod manifest;
mod os_profile;
mod outcome;
mod pipeline;
mod platform;
mod progress;
mod sequencer;
mod staging;
mod status;

#[cfg(test)]
mod fakes;

// Re-export public types
pub use completeness::{list_directory, missing_from_listing};
pub use context::{FailurePolicy, InstallContext};
pub use logger::InstallLogger;
pub use manifest::{
    constants, Architecture, ArchiveSpec, ArtifactManifestEntry, InstallPlan, ManifestSource,
};
pub use os_profile::{select_branch, InstallBranch, InstallScope, OsProfile};
pub use outcome::{Halted, InstallationOutcome, RunReport, Stage, StepError, StepRecord, Terminal};
pub use pipeline::{run_pipeline, Collaborators};
pub use platform::{
    AppxInstaller, Chocolatey, CimOsIdentity, CommandResolver, ExternalInstaller, HttpTransport,
    Operator, OsIdentity, PackageInstaller, PathResolver, Presence, PrimaryPackageManager,
    SecondaryPackageManager, Transport, Unattended, WingetCli,
};
pub use progress::{ProgressCallback, ProgressReporter};
pub use sequencer::{InstallationSequencer, Installers, SequencerState};
pub use status::{collect_status, ArtifactStatus, CommandStatus, StatusReport};

/// Configuration options for one installation run
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Directory every artifact is downloaded into and installed from
    pub staging_dir: PathBuf,
    /// Stop at the first failure, or report and carry on
    pub policy: FailurePolicy,
    /// Which artifact set to download
    pub source: ManifestSource,
    /// Architecture of the runtime libraries
    pub arch: Architecture,
    /// Write an installation log file into the staging directory
    pub log_file: bool,
    /// Wait for Enter after every failure and warning
    pub pause: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            staging_dir: std::env::temp_dir().join(constants::STAGING_DIR_NAME),
            policy: FailurePolicy::FailFast,
            source: ManifestSource::DirectDownloads,
            arch: Architecture::current(),
            log_file: true,
            pause: true,
        }
    }
}

impl InstallConfig {
    pub fn plan(&self) -> InstallPlan {
        InstallPlan::for_source(self.source, self.arch)
    }
}

/// Install the package manager on this host.
///
/// `operator` is asked to acknowledge every failure under the best-effort
/// policy and every compatibility warning.
pub fn install(config: &InstallConfig, operator: &dyn Operator) -> Result<RunReport, Halted> {
    install_with_progress(config, operator, None)
}

/// Install with a progress callback instead of console progress lines
pub fn install_with_progress(
    config: &InstallConfig,
    operator: &dyn Operator,
    progress: Option<ProgressCallback>,
) -> Result<RunReport, Halted> {
    let transport = HttpTransport::new();
    let packages = AppxInstaller::new();
    let chocolatey = Chocolatey::new(&config.staging_dir);

    run_pipeline(
        config,
        Collaborators {
            transport: &transport,
            installers: Installers {
                packages: &packages,
                os: &CimOsIdentity,
                bootstrap: &chocolatey,
                secondary: &chocolatey,
                resolver: &PathResolver,
                primary: &WingetCli,
            },
            operator,
        },
        ProgressReporter::new(progress),
    )
}

/// Staged artifacts and resolvable commands, without changing anything
pub fn check_status(config: &InstallConfig) -> StatusReport {
    collect_status(&config.plan(), &config.staging_dir, &PathResolver)
}
