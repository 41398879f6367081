//! AppX package installation through the Appx PowerShell module

use std::path::Path;

use super::powershell::{self, quote};
use super::PackageInstaller;

/// Installs `.appx`/`.msixbundle` files with `Add-AppxPackage` and
/// `Add-AppxProvisionedPackage`
#[derive(Debug, Default)]
pub struct AppxInstaller;

impl AppxInstaller {
    pub fn new() -> Self {
        Self
    }

    fn install_command(package: &Path) -> String {
        format!("Add-AppxPackage -Path {} -ErrorAction Stop", quote(package))
    }

    fn provision_command(package: &Path, license: &Path) -> String {
        format!(
            "Add-AppxProvisionedPackage -Online -PackagePath {} -LicensePath {} -ErrorAction Stop",
            quote(package),
            quote(license)
        )
    }
}

impl PackageInstaller for AppxInstaller {
    fn install_package(&self, package: &Path) -> Result<(), String> {
        powershell::run_command(&Self::install_command(package)).map(|_| ())
    }

    fn install_provisioned_package(&self, package: &Path, license: &Path) -> Result<(), String> {
        powershell::run_command(&Self::provision_command(package, license)).map(|_| ())
    }
}
