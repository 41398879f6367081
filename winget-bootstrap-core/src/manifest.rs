//! Artifact manifests for the two download sources
//!
//! Every URL and file name the installer touches is a literal here. The
//! "direct" source pulls each runtime library from its own release; the
//! "dependency archive" source pulls the single dependencies zip that ships
//! with the package manager release and copies the libraries out of it.

use serde::Serialize;

// Constants for external URLs and installation
pub mod constants {
    /// Package manager release assets
    pub const WINGET_RELEASES_LATEST: &str =
        "https://github.com/microsoft/winget-cli/releases/latest/download";
    pub const WINGET_BUNDLE: &str = "Microsoft.DesktopAppInstaller_8wekyb3d8bbwe.msixbundle";
    pub const WINGET_LICENSE: &str = "e53e159d00e04f729cc2180cffd1c02e_License1.xml";
    pub const WINGET_DEPENDENCIES_ZIP: &str = "DesktopAppInstaller_Dependencies.zip";

    /// Runtime library sources used by the direct-download manifest
    pub const VCLIBS_BASE: &str = "https://aka.ms";
    pub const UI_XAML_BASE: &str =
        "https://github.com/microsoft/microsoft-ui-xaml/releases/download/v2.8.6";

    /// Versioned runtime library names inside the dependencies archive
    pub const ARCHIVE_VCLIBS_VERSION: &str = "14.0.33728.0";
    pub const ARCHIVE_UI_XAML_VERSION: &str = "8.2310.30001.0";

    /// Directory (under staging) the dependencies archive is expanded into
    pub const EXTRACT_DIR_NAME: &str = "extracted-dependencies";

    /// Secondary package manager
    pub const CHOCOLATEY_INSTALL: &str = "https://community.chocolatey.org/install.ps1";
    pub const CHOCOLATEY_SCRIPT_NAME: &str = "install-chocolatey.ps1";

    /// Commands resolved on the search path
    pub const WINGET_COMMAND: &str = "winget";
    pub const CHOCO_COMMAND: &str = "choco";

    /// Package name the secondary manager installs the primary under
    pub const WINGET_FALLBACK_PACKAGE: &str = "winget";

    /// Lowest OS build the package manager supports
    pub const MIN_SUPPORTED_BUILD: u32 = 17763;

    /// Default staging directory name (under the system temp dir)
    pub const STAGING_DIR_NAME: &str = "winget-bootstrap";
}

/// One file to retrieve and the name it is stored under in the staging directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactManifestEntry {
    pub source_location: String,
    pub local_name: String,
}

impl ArtifactManifestEntry {
    pub fn new(source_location: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            source_location: source_location.into(),
            local_name: local_name.into(),
        }
    }
}

/// Which of the two literal artifact sets to download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ManifestSource {
    /// Each runtime library is downloaded from its own release
    #[default]
    DirectDownloads,
    /// Runtime libraries are copied out of the release's dependencies zip
    DependencyArchive,
}

/// Processor architecture the runtime libraries are built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Architecture {
    X64,
    X86,
    Arm64,
}

impl Architecture {
    /// Architecture of the running binary
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86" => Architecture::X86,
            "aarch64" => Architecture::Arm64,
            _ => Architecture::X64,
        }
    }

    /// Name used in artifact file names and archive folders
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X64 => "x64",
            Architecture::X86 => "x86",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl Default for Architecture {
    fn default() -> Self {
        Self::current()
    }
}

/// Dependency archive layout: where it expands and what gets copied out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSpec {
    /// Local name of the downloaded archive
    pub archive_name: String,
    /// Directory under staging the archive is expanded into
    pub extract_dir_name: String,
    /// Subdirectory of the expanded tree holding the entries
    pub subdirectory: String,
    /// Allow-list of entry names copied into staging
    pub entries: Vec<String>,
}

/// Everything the pipeline needs to know about one download source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub source: ManifestSource,
    pub arch: Architecture,
    pub manifest: Vec<ArtifactManifestEntry>,
    pub archive: Option<ArchiveSpec>,
    /// Runtime library packages, installed in this order
    pub runtime_packages: Vec<String>,
    pub bundle: String,
    pub license: String,
}

impl InstallPlan {
    /// Build the literal plan for a source and architecture
    pub fn for_source(source: ManifestSource, arch: Architecture) -> Self {
        use constants::*;

        let arch_name = arch.as_str();
        let bundle_entry = ArtifactManifestEntry::new(
            format!("{}/{}", WINGET_RELEASES_LATEST, WINGET_BUNDLE),
            WINGET_BUNDLE,
        );
        let license_entry = ArtifactManifestEntry::new(
            format!("{}/{}", WINGET_RELEASES_LATEST, WINGET_LICENSE),
            WINGET_LICENSE,
        );

        match source {
            ManifestSource::DirectDownloads => {
                let vclibs = format!("Microsoft.VCLibs.{}.14.00.Desktop.appx", arch_name);
                let ui_xaml = format!("Microsoft.UI.Xaml.2.8.{}.appx", arch_name);

                Self {
                    source,
                    arch,
                    manifest: vec![
                        ArtifactManifestEntry::new(
                            format!("{}/{}", VCLIBS_BASE, vclibs),
                            &vclibs,
                        ),
                        ArtifactManifestEntry::new(
                            format!("{}/{}", UI_XAML_BASE, ui_xaml),
                            &ui_xaml,
                        ),
                        bundle_entry,
                        license_entry,
                    ],
                    archive: None,
                    runtime_packages: vec![vclibs, ui_xaml],
                    bundle: WINGET_BUNDLE.to_string(),
                    license: WINGET_LICENSE.to_string(),
                }
            }
            ManifestSource::DependencyArchive => {
                let vclibs = format!(
                    "Microsoft.VCLibs.140.00.UWPDesktop_{}_{}.appx",
                    ARCHIVE_VCLIBS_VERSION, arch_name
                );
                let ui_xaml = format!(
                    "Microsoft.UI.Xaml.2.8_{}_{}.appx",
                    ARCHIVE_UI_XAML_VERSION, arch_name
                );

                Self {
                    source,
                    arch,
                    manifest: vec![
                        ArtifactManifestEntry::new(
                            format!("{}/{}", WINGET_RELEASES_LATEST, WINGET_DEPENDENCIES_ZIP),
                            WINGET_DEPENDENCIES_ZIP,
                        ),
                        bundle_entry,
                        license_entry,
                    ],
                    archive: Some(ArchiveSpec {
                        archive_name: WINGET_DEPENDENCIES_ZIP.to_string(),
                        extract_dir_name: EXTRACT_DIR_NAME.to_string(),
                        subdirectory: arch_name.to_string(),
                        entries: vec![vclibs.clone(), ui_xaml.clone()],
                    }),
                    runtime_packages: vec![vclibs, ui_xaml],
                    bundle: WINGET_BUNDLE.to_string(),
                    license: WINGET_LICENSE.to_string(),
                }
            }
        }
    }

    /// Names that must be present in staging before installation starts
    pub fn required_artifacts(&self) -> Vec<String> {
        let mut required = self.runtime_packages.clone();
        required.push(self.bundle.clone());
        required.push(self.license.clone());
        required
    }
}
