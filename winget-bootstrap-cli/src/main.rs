use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use winget_bootstrap_core::{
    FailurePolicy, InstallConfig, Operator, RunReport, Terminal, Unattended,
};

mod cli;

/// Waits for Enter on stdin after each failure or warning
struct ConsoleOperator;

impl Operator for ConsoleOperator {
    fn acknowledge(&self, _message: &str) {
        print!("Press Enter to continue...");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
            log::debug!("stdin unavailable, continuing: {}", e);
        }
    }
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run report to {}", path.display()))?;
    println!("Run report written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    // Everything this tool drives (AppX, CIM, PowerShell) is Windows-only
    if !cfg!(windows) {
        eprintln!("ERROR: winget-bootstrap only runs on Windows.");
        eprintln!("The Windows Package Manager and its runtime libraries are Windows packages.");
        std::process::exit(1);
    }

    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let defaults = InstallConfig::default();
    let config = InstallConfig {
        staging_dir: args.staging_dir.clone().unwrap_or(defaults.staging_dir),
        policy: if args.keep_going {
            FailurePolicy::BestEffort
        } else {
            FailurePolicy::FailFast
        },
        source: args.source.into(),
        arch: defaults.arch,
        log_file: !args.no_log_file,
        pause: !args.no_pause,
    };

    if args.check {
        winget_bootstrap_core::check_status(&config).print();
        return Ok(());
    }

    log::info!(
        "Staging directory: {} ({:?})",
        config.staging_dir.display(),
        config.policy
    );

    let operator: &dyn Operator = if config.pause {
        &ConsoleOperator
    } else {
        &Unattended
    };

    let (report, halted) = match winget_bootstrap_core::install(&config, operator) {
        Ok(report) => (report, None),
        Err(halted) => (halted.report, Some(halted.error)),
    };

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }

    if let Some(error) = halted {
        eprintln!("\n❌ Installation stopped: {}", error);
        eprintln!("Fix the problem and run winget-bootstrap again; finished steps are skipped.");
        std::process::exit(1);
    }

    match report.terminal {
        Some(Terminal::Done) => println!("\n✅ winget is installed and ready."),
        _ => {
            println!(
                "\n⚠ Installation completed with or without errors ({} failed steps, {} warnings).",
                report.failure_count(),
                report.warnings.len()
            );
            println!("Review the messages above.");
        }
    }

    Ok(())
}
