//! Installation sequencer
//!
//! Drives the installs in a fixed order with no back-edges:
//!
//! 1. runtime libraries
//! 2. the package manager (current-user or provisioned, by OS profile)
//! 3. the secondary package manager
//! 4. verification, with a single fallback through the secondary manager
//!
//! Nothing is rolled back when a later state fails.

use crate::context::InstallContext;
use crate::manifest::{constants, InstallPlan};
use crate::os_profile::{select_branch, InstallBranch, InstallScope};
use crate::outcome::{InstallationOutcome, Stage, StepError, Terminal};
use crate::platform::{
    CommandResolver, ExternalInstaller, OsIdentity, PackageInstaller, Presence,
    PrimaryPackageManager, SecondaryPackageManager,
};

/// Host capabilities the sequencer installs through
#[derive(Clone, Copy)]
pub struct Installers<'a> {
    pub packages: &'a dyn PackageInstaller,
    pub os: &'a dyn OsIdentity,
    pub bootstrap: &'a dyn ExternalInstaller,
    pub secondary: &'a dyn SecondaryPackageManager,
    pub resolver: &'a dyn CommandResolver,
    pub primary: &'a dyn PrimaryPackageManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    RuntimeLibraries,
    PackageManagerInstall,
    SecondaryManagerInstall,
    Verification,
    Terminal(Terminal),
}

pub struct InstallationSequencer<'a> {
    installers: Installers<'a>,
    plan: &'a InstallPlan,
}

impl<'a> InstallationSequencer<'a> {
    pub fn new(installers: Installers<'a>, plan: &'a InstallPlan) -> Self {
        Self { installers, plan }
    }

    /// Run every state in order until the terminal state.
    ///
    /// `Err` means a failure under the fail-fast policy stopped the run.
    pub fn run(&self, ctx: &mut InstallContext) -> Result<Terminal, StepError> {
        let mut state = SequencerState::RuntimeLibraries;

        loop {
            log::debug!("sequencer state: {:?}", state);
            state = match state {
                SequencerState::RuntimeLibraries => {
                    self.install_runtime_libraries(ctx)?;
                    SequencerState::PackageManagerInstall
                }
                SequencerState::PackageManagerInstall => {
                    self.install_package_manager(ctx)?;
                    SequencerState::SecondaryManagerInstall
                }
                SequencerState::SecondaryManagerInstall => {
                    self.install_secondary_manager(ctx)?;
                    SequencerState::Verification
                }
                SequencerState::Verification => {
                    self.verify(ctx)?;
                    SequencerState::Terminal(ctx.terminal())
                }
                SequencerState::Terminal(terminal) => {
                    ctx.report_mut().terminal = Some(terminal);
                    return Ok(terminal);
                }
            };
        }
    }

    /// S0: each runtime library is attempted regardless of the other's result
    fn install_runtime_libraries(&self, ctx: &mut InstallContext) -> Result<(), StepError> {
        for (index, name) in self.plan.runtime_packages.iter().enumerate() {
            ctx.progress().report_step(
                &format!("Installing {}...", name),
                50,
                60,
                index,
                self.plan.runtime_packages.len(),
            );

            let outcome = match self.installers.packages.install_package(&ctx.staged(name)) {
                Ok(()) => InstallationOutcome::Success,
                Err(reason) => InstallationOutcome::Failed(StepError::PackageInstallFailure {
                    name: name.clone(),
                    reason,
                }),
            };
            ctx.record(Stage::RuntimeLibraries, name, outcome)?;
        }
        Ok(())
    }

    /// S1: pick current-user or provisioned install from the OS profile
    fn install_package_manager(&self, ctx: &mut InstallContext) -> Result<(), StepError> {
        ctx.progress().report("Installing the Windows Package Manager...", 60);

        let branch = match self.installers.os.read_profile() {
            Ok(profile) => {
                println!(
                    "Detected {} (version {}, build {})",
                    profile.caption, profile.major_version, profile.build_number
                );
                select_branch(&profile)
            }
            Err(e) => {
                ctx.warn(format!(
                    "Could not determine the OS version ({}); provisioning for all users",
                    e
                ));
                InstallBranch {
                    scope: InstallScope::Provisioned,
                    compatibility_warning: None,
                }
            }
        };

        if let Some(warning) = &branch.compatibility_warning {
            ctx.advise(warning.clone());
        }
        ctx.report_mut().branch = Some(branch.clone());

        let bundle = ctx.staged(&self.plan.bundle);
        let outcome = match branch.scope {
            InstallScope::CurrentUser => {
                log::info!("Installing {} for the current user", self.plan.bundle);
                match self.installers.packages.install_package(&bundle) {
                    Ok(()) => InstallationOutcome::Success,
                    Err(reason) => InstallationOutcome::Failed(StepError::PackageInstallFailure {
                        name: self.plan.bundle.clone(),
                        reason,
                    }),
                }
            }
            InstallScope::Provisioned => {
                log::info!("Provisioning {} for all users", self.plan.bundle);
                let license = ctx.staged(&self.plan.license);
                match self
                    .installers
                    .packages
                    .install_provisioned_package(&bundle, &license)
                {
                    Ok(()) => InstallationOutcome::Success,
                    Err(reason) => InstallationOutcome::Failed(StepError::ProvisioningFailure {
                        name: self.plan.bundle.clone(),
                        reason,
                    }),
                }
            }
        };
        ctx.record(Stage::PackageManager, &self.plan.bundle, outcome)
    }

    /// S2: bootstrap the secondary manager unless it is already on disk
    fn install_secondary_manager(&self, ctx: &mut InstallContext) -> Result<(), StepError> {
        ctx.progress().report("Checking Chocolatey installation...", 75);

        let outcome = match self.installers.bootstrap.ensure_installed() {
            Ok(Presence::AlreadyPresent) => InstallationOutcome::AlreadySatisfied,
            Ok(Presence::Installed) => InstallationOutcome::Success,
            Err(reason) => {
                InstallationOutcome::Failed(StepError::SecondaryManagerBootstrapFailure { reason })
            }
        };
        ctx.record(Stage::SecondaryManager, "chocolatey", outcome)
    }

    /// S3: the package manager must resolve, directly or after one fallback install
    fn verify(&self, ctx: &mut InstallContext) -> Result<(), StepError> {
        ctx.progress().report("Verifying the package manager...", 90);
        let command = constants::WINGET_COMMAND;

        if let Some(path) = self.installers.resolver.resolve(command) {
            println!("{} is available at {}", command, path.display());
            ctx.record(Stage::Verification, command, InstallationOutcome::Success)?;

            if let Err(e) = self.installers.primary.upgrade_all(&path) {
                ctx.warn(format!("Upgrading installed packages failed: {}", e));
            }
            return Ok(());
        }

        println!(
            "{} was not found on PATH. Trying to install it with Chocolatey...",
            command
        );
        let fallback_error = self
            .installers
            .secondary
            .install_package(constants::WINGET_FALLBACK_PACKAGE)
            .err();

        let outcome = match self.installers.resolver.resolve(command) {
            Some(path) => {
                println!(
                    "{} is available at {} (installed via Chocolatey)",
                    command,
                    path.display()
                );
                if let Some(e) = fallback_error {
                    ctx.warn(format!("Chocolatey reported an error: {}", e));
                }
                InstallationOutcome::Success
            }
            None => {
                let reason = match fallback_error {
                    Some(e) => format!("Chocolatey fallback failed: {}", e),
                    None => "still not found after the Chocolatey fallback".to_string(),
                };
                InstallationOutcome::Failed(StepError::VerificationFailure {
                    command: command.to_string(),
                    reason,
                })
            }
        };
        ctx.record(Stage::Verification, command, outcome)
    }
}
