//! Host capabilities the installer drives
//!
//! Each external collaborator is a trait so the pipeline can run against
//! fakes. The Windows implementations live in the submodules:
//! - `http`: artifact downloads (reqwest)
//! - `appx`: AppX package installation through PowerShell
//! - `identity`: OS version/build/caption through CIM
//! - `resolver`: command lookup on PATH
//! - `winget`: the primary package manager's own commands
//! - `chocolatey`: secondary package manager bootstrap and installs

use std::path::{Path, PathBuf};

mod appx;
mod chocolatey;
mod http;
mod identity;
mod powershell;
mod resolver;
mod winget;

pub use appx::AppxInstaller;
pub use chocolatey::Chocolatey;
pub use http::HttpTransport;
pub use identity::CimOsIdentity;
pub use resolver::PathResolver;
pub use winget::WingetCli;

use crate::os_profile::OsProfile;

/// Opaque content source
pub trait Transport {
    /// Retrieve `url` and write it to `dest`, returning the number of bytes written
    fn download(&self, url: &str, dest: &Path) -> Result<u64, String>;
}

/// OS package-installation facility
pub trait PackageInstaller {
    /// Install a package file for the current user
    fn install_package(&self, package: &Path) -> Result<(), String>;

    /// Provision a package file with its license for all users
    fn install_provisioned_package(&self, package: &Path, license: &Path) -> Result<(), String>;
}

/// OS identity query
pub trait OsIdentity {
    fn read_profile(&self) -> Result<OsProfile, String>;
}

/// Command search-path query
pub trait CommandResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf>;
}

/// The package manager being provisioned, once it is on PATH
pub trait PrimaryPackageManager {
    /// Upgrade every installed package
    fn upgrade_all(&self, executable: &Path) -> Result<(), String>;
}

/// Whether an external installer had anything to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    AlreadyPresent,
    Installed,
}

/// Installer fetched and executed from a remote location.
/// This is a trust boundary: the fetched script is run as-is.
pub trait ExternalInstaller {
    fn ensure_installed(&self) -> Result<Presence, String>;
}

/// Fallback package manager
pub trait SecondaryPackageManager {
    fn install_package(&self, name: &str) -> Result<(), String>;
}

/// Someone who has to acknowledge failures and warnings before the run goes on
pub trait Operator {
    fn acknowledge(&self, message: &str);
}

/// Operator that never pauses
pub struct Unattended;

impl Operator for Unattended {
    fn acknowledge(&self, message: &str) {
        log::debug!("continuing without pause after: {}", message);
    }
}
