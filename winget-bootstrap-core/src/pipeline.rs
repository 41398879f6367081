//! The whole run: prepare, fetch, expand, check, install

use crate::archive::expand_archive;
use crate::completeness::check_completeness;
use crate::context::InstallContext;
use crate::fetch::fetch_artifacts;
use crate::logger::InstallLogger;
use crate::manifest::InstallPlan;
use crate::outcome::{Halted, RunReport, StepError, Terminal};
use crate::platform::{Operator, Transport};
use crate::progress::ProgressReporter;
use crate::sequencer::{InstallationSequencer, Installers};
use crate::InstallConfig;

/// Installation logs kept in the staging directory
const KEEP_LOGS: usize = 5;

/// Everything outside the process the run talks to
pub struct Collaborators<'a> {
    pub transport: &'a dyn Transport,
    pub installers: Installers<'a>,
    pub operator: &'a dyn Operator,
}

/// Run every stage in order.
///
/// Returns the report when the sequencer reached its terminal state, or
/// [`Halted`] (carrying the partial report) when a fail-fast run stopped early.
pub fn run_pipeline(
    config: &InstallConfig,
    collaborators: Collaborators,
    progress: ProgressReporter,
) -> Result<RunReport, Halted> {
    let mut ctx = InstallContext::new(&config.staging_dir, config.policy, collaborators.operator)
        .with_progress(progress);
    let plan = config.plan();

    match run_stages(&mut ctx, config, &collaborators, &plan) {
        Ok(terminal) => {
            let message = match terminal {
                Terminal::Done => "Installation complete",
                Terminal::DoneWithWarnings => "Installation finished with warnings",
            };
            ctx.progress().report(message, 100);
            Ok(ctx.into_report())
        }
        Err(error) => {
            log::debug!("installation halted: {}", error);
            Err(Halted {
                error,
                report: ctx.into_report(),
            })
        }
    }
}

fn run_stages(
    ctx: &mut InstallContext,
    config: &InstallConfig,
    collaborators: &Collaborators,
    plan: &InstallPlan,
) -> Result<Terminal, StepError> {
    ctx.progress().report("Starting installation...", 0);

    crate::staging::prepare_staging_dir(ctx)?;

    if config.log_file {
        attach_log_file(ctx);
    }

    log::info!(
        "Using {:?} manifest for {} ({} files)",
        plan.source,
        plan.arch.as_str(),
        plan.manifest.len()
    );
    fetch_artifacts(ctx, collaborators.transport, &plan.manifest)?;

    if let Some(archive) = &plan.archive {
        expand_archive(ctx, archive)?;
    }

    check_completeness(ctx, &plan.required_artifacts())?;

    InstallationSequencer::new(collaborators.installers, plan).run(ctx)
}

fn attach_log_file(ctx: &mut InstallContext) {
    let dir = ctx.staging_dir().to_path_buf();

    match InstallLogger::prune(&dir, KEEP_LOGS.saturating_sub(1)) {
        Ok(removed) if removed > 0 => log::debug!("removed {} old installation logs", removed),
        Ok(_) => {}
        Err(e) => log::warn!("Failed to clean up old installation logs: {}", e),
    }

    match InstallLogger::new(&dir) {
        Ok(logger) => {
            println!("Installation log: {}", logger.log_path().display());
            ctx.set_logger(logger);
        }
        Err(e) => log::warn!("Continuing without a log file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FailurePolicy;
    use crate::fakes::*;
    use crate::manifest::{Architecture, ManifestSource};
    use crate::outcome::{InstallationOutcome, Stage};
    use std::collections::BTreeMap;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    struct Host {
        transport: FakeTransport,
        packages: FakeInstaller,
        os: FakeOs,
        secondary: FakeSecondary,
        resolver: FakeResolver,
        primary: FakePrimary,
        operator: RecordingOperator,
    }

    impl Host {
        fn new() -> Self {
            Self {
                transport: FakeTransport::default(),
                packages: FakeInstaller::default(),
                os: FakeOs::desktop(),
                secondary: FakeSecondary {
                    present: true,
                    ..Default::default()
                },
                resolver: FakeResolver::found(),
                primary: FakePrimary::default(),
                operator: RecordingOperator::default(),
            }
        }

        fn run(&self, config: &InstallConfig) -> Result<RunReport, Halted> {
            run_pipeline(
                config,
                Collaborators {
                    transport: &self.transport,
                    installers: Installers {
                        packages: &self.packages,
                        os: &self.os,
                        bootstrap: &self.secondary,
                        secondary: &self.secondary,
                        resolver: &self.resolver,
                        primary: &self.primary,
                    },
                    operator: &self.operator,
                },
                ProgressReporter::new(Some(Box::new(|_: &str, _: u8| {}))),
            )
        }
    }

    fn config(dir: &Path, policy: FailurePolicy, source: ManifestSource) -> InstallConfig {
        InstallConfig {
            staging_dir: dir.to_path_buf(),
            policy,
            source,
            arch: Architecture::X64,
            log_file: false,
            pause: false,
        }
    }

    fn direct(dir: &Path, policy: FailurePolicy) -> InstallConfig {
        config(dir, policy, ManifestSource::DirectDownloads)
    }

    fn from_archive(dir: &Path) -> InstallConfig {
        config(dir, FailurePolicy::FailFast, ManifestSource::DependencyArchive)
    }

    /// File name -> contents for every file under `dir`
    fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().display().to_string();
                (rel, std::fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_empty_staging_all_downloads_succeed() {
        let temp_dir = TempDir::new().unwrap();
        let stage = temp_dir.path().join("stage");
        let host = Host::new();

        let report = host.run(&direct(&stage, FailurePolicy::FailFast)).unwrap();

        assert_eq!(host.transport.call_count(), 4);
        assert!(report.missing.is_empty());
        assert_eq!(report.terminal, Some(Terminal::Done));
        assert_eq!(report.failure_count(), 0);
    }

    #[test]
    fn test_transfer_failure_fail_fast_halts_before_install() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = Host::new();
        host.transport = FakeTransport::failing(&["Microsoft.UI.Xaml.2.8.x64.appx"]);

        let halted = host
            .run(&direct(temp_dir.path(), FailurePolicy::FailFast))
            .unwrap_err();

        assert!(matches!(halted.error, StepError::TransferFailure { .. }));
        assert!(host.packages.calls.borrow().is_empty());
        assert_eq!(halted.report.terminal, None);
        assert_eq!(host.transport.call_count(), 2);
    }

    #[test]
    fn test_transfer_failure_best_effort_reaches_terminal() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = Host::new();
        host.transport = FakeTransport::failing(&["Microsoft.UI.Xaml.2.8.x64.appx"]);

        let report = host
            .run(&direct(temp_dir.path(), FailurePolicy::BestEffort))
            .unwrap();

        assert_eq!(report.failures_in(Stage::Fetch), 1);
        assert_eq!(
            report.missing,
            vec!["Microsoft.UI.Xaml.2.8.x64.appx".to_string()]
        );
        assert_eq!(report.terminal, Some(Terminal::DoneWithWarnings));
        assert_eq!(host.transport.call_count(), 4);
    }

    #[test]
    fn test_second_run_transfers_nothing_and_leaves_same_files() {
        let temp_dir = TempDir::new().unwrap();
        let host = Host::new();
        let cfg = direct(temp_dir.path(), FailurePolicy::FailFast);

        host.run(&cfg).unwrap();
        let first = snapshot(temp_dir.path());
        let transfers = host.transport.call_count();

        host.run(&cfg).unwrap();

        assert_eq!(host.transport.call_count(), transfers);
        assert_eq!(snapshot(temp_dir.path()), first);
    }

    #[test]
    fn test_staging_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let stage = temp_dir.path().join("a").join("b");
        let host = Host::new();

        host.run(&direct(&stage, FailurePolicy::FailFast)).unwrap();

        assert!(stage.is_dir());
    }

    #[test]
    fn test_log_file_is_written_to_staging() {
        let temp_dir = TempDir::new().unwrap();
        let host = Host::new();
        let mut cfg = direct(temp_dir.path(), FailurePolicy::FailFast);
        cfg.log_file = true;

        host.run(&cfg).unwrap();

        let logs: Vec<_> = crate::completeness::list_directory(temp_dir.path())
            .into_iter()
            .filter(|n| n.starts_with("winget-bootstrap-") && n.ends_with(".log"))
            .collect();
        assert_eq!(logs.len(), 1);
        let content = std::fs::read_to_string(temp_dir.path().join(&logs[0])).unwrap();
        assert!(content.contains("[fetch]"));
        assert!(content.contains("finished: Done"));
    }

    /// The fake transport writes text, so the archive is placed up front and
    /// the manifest entry is satisfied by presence.
    fn stage_dependency_archive(dir: &Path, plan: &InstallPlan) {
        let layout = plan.archive.as_ref().unwrap();
        let file = File::create(dir.join(&layout.archive_name)).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for entry in &layout.entries {
            zip.start_file(format!("{}/{}", layout.subdirectory, entry), options)
                .unwrap();
            zip.write_all(entry.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_dependency_archive_source() {
        let temp_dir = TempDir::new().unwrap();
        let plan = from_archive(temp_dir.path()).plan();
        stage_dependency_archive(temp_dir.path(), &plan);
        let host = Host::new();

        let report = host.run(&from_archive(temp_dir.path())).unwrap();

        assert_eq!(report.terminal, Some(Terminal::Done));
        // Archive already present: only bundle and license are fetched
        assert_eq!(host.transport.call_count(), 2);
        for name in &plan.runtime_packages {
            assert!(temp_dir.path().join(name).is_file(), "{} not copied", name);
        }
        assert!(temp_dir
            .path()
            .join(&plan.archive.as_ref().unwrap().extract_dir_name)
            .join("x64")
            .is_dir());
    }

    #[test]
    fn test_dependency_archive_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let plan = from_archive(temp_dir.path()).plan();
        stage_dependency_archive(temp_dir.path(), &plan);
        let host = Host::new();
        let cfg = from_archive(temp_dir.path());

        host.run(&cfg).unwrap();
        let first = snapshot(temp_dir.path());
        let report = host.run(&cfg).unwrap();

        assert_eq!(snapshot(temp_dir.path()), first);
        assert!(report
            .records_in(Stage::Expand)
            .all(|r| r.outcome == InstallationOutcome::AlreadySatisfied));
    }
}
