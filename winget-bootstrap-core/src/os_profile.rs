//! Host OS facts and the package-manager installation branch they select

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::manifest::constants::MIN_SUPPORTED_BUILD;

lazy_static! {
    // Consumer desktop editions report "Microsoft Windows 10 Pro", "Microsoft Windows 11 Home", ...
    static ref DESKTOP_CAPTION: Regex = Regex::new(r"(?i)\bwindows\s+1[01]\b").unwrap();
    static ref SERVER_CAPTION: Regex = Regex::new(r"(?i)\bserver\b").unwrap();
}

/// Facts read once from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsProfile {
    /// "major.minor" part of the version, e.g. "10.0"
    pub major_version: String,
    pub build_number: u32,
    pub caption: String,
}

/// Raw shape of `Win32_OperatingSystem` as emitted by `ConvertTo-Json`
#[derive(Debug, Deserialize)]
struct CimOperatingSystem {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "BuildNumber")]
    build_number: String,
    #[serde(rename = "Caption")]
    caption: String,
}

impl OsProfile {
    /// Parse the JSON produced by
    /// `Get-CimInstance Win32_OperatingSystem | Select-Object Version,BuildNumber,Caption | ConvertTo-Json`
    pub fn from_cim_json(json: &str) -> Result<Self, String> {
        let raw: CimOperatingSystem = serde_json::from_str(json.trim())
            .map_err(|e| format!("Failed to parse OS information: {}", e))?;

        let build_number = raw
            .build_number
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("Invalid build number '{}': {}", raw.build_number, e))?;

        Ok(Self {
            major_version: major_version_of(&raw.version),
            build_number,
            caption: raw.caption.trim().to_string(),
        })
    }

    /// True for Windows 10/11 client editions
    pub fn is_desktop(&self) -> bool {
        DESKTOP_CAPTION.is_match(&self.caption) && !SERVER_CAPTION.is_match(&self.caption)
    }

    pub fn meets_minimum_build(&self) -> bool {
        self.build_number >= MIN_SUPPORTED_BUILD
    }
}

/// "10.0.19045" -> "10.0"
fn major_version_of(version: &str) -> String {
    version
        .trim()
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}

/// Who the package manager gets installed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallScope {
    /// Single-package install for the current user
    CurrentUser,
    /// Package + license provisioned for all users
    Provisioned,
}

/// Branch chosen for the package manager install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallBranch {
    pub scope: InstallScope,
    /// Raised when the build is older than the package manager supports
    pub compatibility_warning: Option<String>,
}

/// Pick the install scope for a host.
///
/// The build threshold is advisory: an old build still gets the desktop path,
/// with a warning the operator has to acknowledge first.
pub fn select_branch(profile: &OsProfile) -> InstallBranch {
    let scope = if profile.major_version == "10.0" && profile.is_desktop() {
        InstallScope::CurrentUser
    } else {
        InstallScope::Provisioned
    };

    let compatibility_warning = if profile.meets_minimum_build() {
        None
    } else {
        Some(format!(
            "{} (build {}) is older than build {}, the minimum the package manager supports. \
             Installation will be attempted anyway and may fail.",
            profile.caption, profile.build_number, MIN_SUPPORTED_BUILD
        ))
    };

    InstallBranch {
        scope,
        compatibility_warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(major: &str, build: u32, caption: &str) -> OsProfile {
        OsProfile {
            major_version: major.to_string(),
            build_number: build,
            caption: caption.to_string(),
        }
    }

    #[test]
    fn test_minimum_build_on_desktop_selects_current_user() {
        let branch = select_branch(&profile("10.0", 17763, "Microsoft Windows 10 Pro"));
        assert_eq!(branch.scope, InstallScope::CurrentUser);
        assert!(branch.compatibility_warning.is_none());
    }

    #[test]
    fn test_old_build_on_desktop_warns_but_keeps_current_user() {
        let branch = select_branch(&profile("10.0", 17762, "Microsoft Windows 10 Pro"));
        assert_eq!(branch.scope, InstallScope::CurrentUser);
        let warning = branch.compatibility_warning.expect("warning expected");
        assert!(warning.contains("17762"));
        assert!(warning.contains("17763"));
    }

    #[test]
    fn test_server_caption_selects_provisioned() {
        let branch = select_branch(&profile(
            "10.0",
            20348,
            "Microsoft Windows Server 2022 Datacenter",
        ));
        assert_eq!(branch.scope, InstallScope::Provisioned);
    }

    #[test]
    fn test_windows_11_is_desktop() {
        let branch = select_branch(&profile("10.0", 22631, "Microsoft Windows 11 Home"));
        assert_eq!(branch.scope, InstallScope::CurrentUser);
    }

    #[test]
    fn test_other_major_version_selects_provisioned() {
        let branch = select_branch(&profile("6.3", 9600, "Microsoft Windows 8.1 Pro"));
        assert_eq!(branch.scope, InstallScope::Provisioned);
        assert!(branch.compatibility_warning.is_some());
    }

    #[test]
    fn test_parse_cim_json() {
        let json = r#"{"Version":"10.0.19045","BuildNumber":"19045","Caption":"Microsoft Windows 10 Enterprise "}"#;
        let profile = OsProfile::from_cim_json(json).unwrap();

        assert_eq!(profile.major_version, "10.0");
        assert_eq!(profile.build_number, 19045);
        assert_eq!(profile.caption, "Microsoft Windows 10 Enterprise");
        assert!(profile.is_desktop());
    }

    #[test]
    fn test_parse_cim_json_rejects_bad_build() {
        let json = r#"{"Version":"10.0.19045","BuildNumber":"abc","Caption":"Microsoft Windows 10 Pro"}"#;
        assert!(OsProfile::from_cim_json(json).is_err());
    }
}
