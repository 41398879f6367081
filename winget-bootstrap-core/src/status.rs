//! Read-only status check: what is staged, what is on PATH

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::completeness::{list_directory, missing_from_listing};
use crate::manifest::{constants, InstallPlan};
use crate::platform::CommandResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub name: String,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandStatus {
    pub command: String,
    pub location: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub staging_dir: PathBuf,
    pub artifacts: Vec<ArtifactStatus>,
    pub commands: Vec<CommandStatus>,
}

impl StatusReport {
    /// True when the package manager already resolves
    pub fn package_manager_available(&self) -> bool {
        self.commands
            .iter()
            .any(|c| c.command == constants::WINGET_COMMAND && c.location.is_some())
    }

    pub fn missing_artifacts(&self) -> Vec<&str> {
        self.artifacts
            .iter()
            .filter(|a| !a.present)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Print the status table
    pub fn print(&self) {
        println!("\n==================================================");
        println!("  Installation Status");
        println!("==================================================\n");

        println!("Staging directory: {}\n", self.staging_dir.display());
        for artifact in &self.artifacts {
            let mark = if artifact.present { "✓" } else { "✗" };
            println!("{} {}", mark, artifact.name);
        }
        println!();

        for command in &self.commands {
            match &command.location {
                Some(path) => println!("✓ {} ({})", command.command, path.display()),
                None => println!("✗ {} [not on PATH]", command.command),
            }
        }

        println!("\n==================================================\n");

        if !self.package_manager_available() {
            println!("⚠ {} is not available.", constants::WINGET_COMMAND);
            println!("Run 'winget-bootstrap' to install it.\n");
        }
    }
}

/// Inspect the staging directory and the search path without changing anything
pub fn collect_status(
    plan: &InstallPlan,
    staging_dir: &Path,
    resolver: &dyn CommandResolver,
) -> StatusReport {
    let required = plan.required_artifacts();
    let missing = missing_from_listing(&required, &list_directory(staging_dir));

    let artifacts = required
        .into_iter()
        .map(|name| {
            let present = !missing.contains(&name);
            ArtifactStatus { name, present }
        })
        .collect();

    let commands = [constants::WINGET_COMMAND, constants::CHOCO_COMMAND]
        .iter()
        .map(|command| CommandStatus {
            command: command.to_string(),
            location: resolver.resolve(command),
        })
        .collect();

    StatusReport {
        staging_dir: staging_dir.to_path_buf(),
        artifacts,
        commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeResolver;
    use crate::manifest::{Architecture, ManifestSource};
    use tempfile::TempDir;

    #[test]
    fn test_status_of_partially_staged_directory() {
        let temp_dir = TempDir::new().unwrap();
        let plan = InstallPlan::for_source(ManifestSource::DirectDownloads, Architecture::X64);
        std::fs::write(temp_dir.path().join(&plan.bundle), b"bundle").unwrap();

        let resolver = FakeResolver::scripted(vec![None, Some(PathBuf::from("C:\\choco.exe"))]);
        let status = collect_status(&plan, temp_dir.path(), &resolver);

        assert_eq!(status.artifacts.len(), 4);
        assert_eq!(status.missing_artifacts().len(), 3);
        assert!(!status.missing_artifacts().contains(&plan.bundle.as_str()));
        assert!(!status.package_manager_available());
        assert_eq!(status.commands[1].command, "choco");
        assert!(status.commands[1].location.is_some());
    }

    #[test]
    fn test_status_does_not_create_staging() {
        let temp_dir = TempDir::new().unwrap();
        let stage = temp_dir.path().join("missing");
        let plan = InstallPlan::for_source(ManifestSource::DependencyArchive, Architecture::X64);

        let status = collect_status(&plan, &stage, &FakeResolver::found());

        assert!(!stage.exists());
        assert!(status.artifacts.iter().all(|a| !a.present));
        assert!(status.package_manager_available());
    }
}
