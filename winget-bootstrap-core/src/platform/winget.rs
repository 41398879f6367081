use std::path::Path;
use std::process::Command;

use super::PrimaryPackageManager;

/// The Windows Package Manager command line
#[derive(Debug, Default)]
pub struct WingetCli;

const UPGRADE_ARGS: &[&str] = &[
    "upgrade",
    "--all",
    "--accept-source-agreements",
    "--accept-package-agreements",
    "--silent",
];

impl PrimaryPackageManager for WingetCli {
    fn upgrade_all(&self, executable: &Path) -> Result<(), String> {
        println!("Upgrading installed packages with {}...", executable.display());

        let output = Command::new(executable)
            .args(UPGRADE_ARGS)
            .output()
            .map_err(|e| format!("Failed to execute {}: {}", executable.display(), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            log::debug!("  stdout: {}", line);
        }

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "upgrade exited with status {:?}: {}",
                output.status.code(),
                stderr.trim()
            ))
        }
    }
}
