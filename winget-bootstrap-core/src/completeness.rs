use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::context::InstallContext;
use crate::outcome::{InstallationOutcome, Stage, StepError};

/// Names in `required` that do not appear in `listing`, in `required` order
pub fn missing_from_listing(required: &[String], listing: &[String]) -> Vec<String> {
    let present: HashSet<&str> = listing.iter().map(String::as_str).collect();
    required
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect()
}

/// File names directly inside `dir`
pub fn list_directory(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .collect()
}

/// Check staging for every required artifact.
///
/// All missing names are reported together as one diagnostic.
pub fn check_completeness(ctx: &mut InstallContext, required: &[String]) -> Result<(), StepError> {
    ctx.progress().report("Verifying downloaded files...", 40);

    let listing = list_directory(ctx.staging_dir());
    let missing = missing_from_listing(required, &listing);
    ctx.report_mut().missing = missing.clone();

    let outcome = if missing.is_empty() {
        println!("All {} required files are present", required.len());
        InstallationOutcome::Success
    } else {
        InstallationOutcome::Failed(StepError::MissingArtifact { names: missing })
    };
    ctx.record(Stage::Completeness, "required artifacts", outcome)
}
