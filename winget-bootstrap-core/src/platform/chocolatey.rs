//! Chocolatey package manager integration
//!
//! Chocolatey is only used as a fallback: it is bootstrapped from its remote
//! install script and then asked to install the primary package manager by name.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::http::HttpTransport;
use super::powershell;
use super::{ExternalInstaller, Presence, SecondaryPackageManager, Transport};
use crate::manifest::constants;

/// Chocolatey, rooted at its per-machine data directory
pub struct Chocolatey {
    install_root: PathBuf,
    staging_dir: PathBuf,
    transport: Box<dyn Transport>,
}

impl Chocolatey {
    /// Chocolatey under `%ProgramData%\chocolatey`, staging its installer in `staging_dir`
    pub fn new(staging_dir: &Path) -> Self {
        let program_data =
            std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".to_string());
        Self::with_root(
            PathBuf::from(program_data).join("chocolatey"),
            staging_dir,
            Box::new(HttpTransport::new()),
        )
    }

    pub fn with_root(
        install_root: PathBuf,
        staging_dir: &Path,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            install_root,
            staging_dir: staging_dir.to_path_buf(),
            transport,
        }
    }

    /// Well-known location of `choco.exe`
    pub fn executable(&self) -> PathBuf {
        self.install_root.join("bin").join("choco.exe")
    }

    pub fn is_installed(&self) -> bool {
        self.executable().is_file()
    }

    fn bootstrap(&self) -> Result<(), String> {
        let script = self.staging_dir.join(constants::CHOCOLATEY_SCRIPT_NAME);

        println!("Downloading Chocolatey installer from {}...", constants::CHOCOLATEY_INSTALL);
        self.transport
            .download(constants::CHOCOLATEY_INSTALL, &script)
            .map_err(|e| format!("Failed to download Chocolatey installer: {}", e))?;

        println!("Running Chocolatey installer...");
        powershell::run_file(&script)
            .map_err(|e| format!("Chocolatey installer failed: {}", e))?;

        if !self.is_installed() {
            return Err(format!(
                "installer finished but {} does not exist",
                self.executable().display()
            ));
        }

        Ok(())
    }
}

impl ExternalInstaller for Chocolatey {
    fn ensure_installed(&self) -> Result<Presence, String> {
        if self.is_installed() {
            log::info!("Chocolatey found at {}", self.executable().display());
            return Ok(Presence::AlreadyPresent);
        }

        self.bootstrap()?;
        println!("Chocolatey installed successfully");
        Ok(Presence::Installed)
    }
}

impl SecondaryPackageManager for Chocolatey {
    fn install_package(&self, name: &str) -> Result<(), String> {
        // A fresh install is not on this process's PATH yet
        let choco = if self.is_installed() {
            self.executable()
        } else {
            PathBuf::from(constants::CHOCO_COMMAND)
        };

        println!("Installing {} with Chocolatey...", name);
        let output = Command::new(&choco)
            .args(["install", name, "-y", "--no-progress"])
            .output()
            .map_err(|e| format!("Failed to execute {}: {}", choco.display(), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            log::debug!("  stdout: {}", line);
        }

        if output.status.success() {
            println!("{} installed successfully via Chocolatey", name);
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "choco install {} exited with status {:?}: {}",
                name,
                output.status.code(),
                stderr.trim()
            ))
        }
    }
}
