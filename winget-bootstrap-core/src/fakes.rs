//! In-memory collaborators for tests

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::os_profile::OsProfile;
use crate::platform::{
    CommandResolver, ExternalInstaller, Operator, OsIdentity, PackageInstaller, Presence,
    PrimaryPackageManager, SecondaryPackageManager, Transport,
};

#[derive(Default)]
pub struct RecordingOperator {
    pub messages: RefCell<Vec<String>>,
}

impl RecordingOperator {
    pub fn count(&self) -> usize {
        self.messages.borrow().len()
    }
}

impl Operator for RecordingOperator {
    fn acknowledge(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Writes a small payload for every URL except those whose file name is in `failing`
#[derive(Default)]
pub struct FakeTransport {
    pub failing: HashSet<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for FakeTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, String> {
        self.calls.borrow_mut().push(url.to_string());

        let name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if self.failing.contains(&name) {
            return Err("connection reset".to_string());
        }

        let payload = format!("payload of {}", url);
        std::fs::write(dest, payload.as_bytes()).map_err(|e| e.to_string())?;
        Ok(payload.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallCall {
    Package(String),
    Provisioned { package: String, license: String },
}

#[derive(Default)]
pub struct FakeInstaller {
    pub failing: HashSet<String>,
    pub calls: RefCell<Vec<InstallCall>>,
}

impl FakeInstaller {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

impl PackageInstaller for FakeInstaller {
    fn install_package(&self, package: &Path) -> Result<(), String> {
        let name = file_name(package);
        self.calls.borrow_mut().push(InstallCall::Package(name.clone()));
        if self.failing.contains(&name) {
            Err("0x80073CF3 package failed updates, dependency or conflict validation".to_string())
        } else {
            Ok(())
        }
    }

    fn install_provisioned_package(&self, package: &Path, license: &Path) -> Result<(), String> {
        let name = file_name(package);
        self.calls.borrow_mut().push(InstallCall::Provisioned {
            package: name.clone(),
            license: file_name(license),
        });
        if self.failing.contains(&name) {
            Err("provisioning rejected".to_string())
        } else {
            Ok(())
        }
    }
}

pub struct FakeOs {
    pub profile: Result<OsProfile, String>,
}

impl FakeOs {
    pub fn new(major: &str, build: u32, caption: &str) -> Self {
        Self {
            profile: Ok(OsProfile {
                major_version: major.to_string(),
                build_number: build,
                caption: caption.to_string(),
            }),
        }
    }

    pub fn desktop() -> Self {
        Self::new("10.0", 19045, "Microsoft Windows 10 Pro")
    }

    /// The CIM query fails
    pub fn unreadable() -> Self {
        Self {
            profile: Err("Get-CimInstance: access denied".to_string()),
        }
    }
}

impl OsIdentity for FakeOs {
    fn read_profile(&self) -> Result<OsProfile, String> {
        self.profile.clone()
    }
}

/// Answers resolution queries from a script, then with `fallback` once it runs out
#[derive(Default)]
pub struct FakeResolver {
    pub answers: RefCell<VecDeque<Option<PathBuf>>>,
    pub fallback: Option<PathBuf>,
    pub calls: Cell<usize>,
}

impl FakeResolver {
    /// Resolves on every call
    pub fn found() -> Self {
        Self {
            fallback: Some(PathBuf::from("C:\\WindowsApps\\winget.exe")),
            ..Default::default()
        }
    }

    /// Follows `answers`, then never resolves
    pub fn scripted(answers: Vec<Option<PathBuf>>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            ..Default::default()
        }
    }
}

impl CommandResolver for FakeResolver {
    fn resolve(&self, _command: &str) -> Option<PathBuf> {
        self.calls.set(self.calls.get() + 1);
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => answer,
            None => self.fallback.clone(),
        }
    }
}

#[derive(Default)]
pub struct FakePrimary {
    pub fail: bool,
    pub upgrades: Cell<usize>,
}

impl PrimaryPackageManager for FakePrimary {
    fn upgrade_all(&self, _executable: &Path) -> Result<(), String> {
        self.upgrades.set(self.upgrades.get() + 1);
        if self.fail {
            Err("upgrade exited with status Some(1)".to_string())
        } else {
            Ok(())
        }
    }
}

/// Secondary package manager that is both bootstrap target and fallback installer
#[derive(Default)]
pub struct FakeSecondary {
    pub present: bool,
    pub bootstrap_fails: bool,
    pub install_fails: bool,
    pub bootstraps: Cell<usize>,
    pub installs: RefCell<Vec<String>>,
}

impl ExternalInstaller for FakeSecondary {
    fn ensure_installed(&self) -> Result<Presence, String> {
        if self.present {
            return Ok(Presence::AlreadyPresent);
        }
        self.bootstraps.set(self.bootstraps.get() + 1);
        if self.bootstrap_fails {
            Err("install.ps1 could not be downloaded".to_string())
        } else {
            Ok(Presence::Installed)
        }
    }
}

impl SecondaryPackageManager for FakeSecondary {
    fn install_package(&self, name: &str) -> Result<(), String> {
        self.installs.borrow_mut().push(name.to_string());
        if self.install_fails {
            Err("choco install exited with status Some(1)".to_string())
        } else {
            Ok(())
        }
    }
}
