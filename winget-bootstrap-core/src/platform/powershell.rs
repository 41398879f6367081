//! Thin wrapper around `powershell.exe`

use std::path::Path;
use std::process::{Command, Output};

/// Run a PowerShell command and return stdout on success
pub fn run_command(script: &str) -> Result<String, String> {
    log::debug!("powershell -NoProfile -ExecutionPolicy Bypass -Command \"{}\"", script);

    let output = Command::new("powershell")
        .arg("-NoProfile")
        .arg("-NonInteractive")
        .arg("-ExecutionPolicy")
        .arg("Bypass")
        .arg("-Command")
        .arg(script)
        .output()
        .map_err(|e| format!("Failed to execute PowerShell: {}", e))?;

    into_result(output)
}

/// Run a PowerShell script file and return stdout on success
pub fn run_file(script: &Path) -> Result<String, String> {
    log::debug!(
        "powershell -NoProfile -ExecutionPolicy Bypass -File \"{}\"",
        script.display()
    );

    let output = Command::new("powershell")
        .arg("-NoProfile")
        .arg("-NonInteractive")
        .arg("-ExecutionPolicy")
        .arg("Bypass")
        .arg("-File")
        .arg(script)
        .output()
        .map_err(|e| {
            format!(
                "Failed to execute PowerShell script {}: {}",
                script.display(),
                e
            )
        })?;

    into_result(output)
}

fn into_result(output: Output) -> Result<String, String> {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    log::debug!("exit code: {:?}", output.status.code());
    for line in stdout.lines() {
        log::debug!("  stdout: {}", line);
    }
    for line in stderr.lines() {
        log::debug!("  stderr: {}", line);
    }

    if output.status.success() {
        Ok(stdout)
    } else if stderr.trim().is_empty() {
        Err(format!("exited with status {:?}", output.status.code()))
    } else {
        Err(stderr.trim().to_string())
    }
}

/// Single-quote a path for interpolation into a PowerShell command
pub fn quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}
