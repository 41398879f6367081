//! OS identity through `Win32_OperatingSystem`

use super::powershell;
use super::OsIdentity;
use crate::os_profile::OsProfile;

const QUERY: &str = "Get-CimInstance -ClassName Win32_OperatingSystem | \
                     Select-Object Version,BuildNumber,Caption | \
                     ConvertTo-Json -Compress";

/// Reads version, build number and caption from CIM
#[derive(Debug, Default)]
pub struct CimOsIdentity;

impl OsIdentity for CimOsIdentity {
    fn read_profile(&self) -> Result<OsProfile, String> {
        let json = powershell::run_command(QUERY)
            .map_err(|e| format!("Failed to query OS information: {}", e))?;
        OsProfile::from_cim_json(&json)
    }
}
