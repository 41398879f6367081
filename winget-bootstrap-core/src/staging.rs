//! Environment preparation: make sure the staging directory exists

use crate::context::InstallContext;
use crate::outcome::{InstallationOutcome, Stage, StepError};

/// Create the staging directory if it is missing.
///
/// Always fatal on failure: nothing downstream can run without it.
pub fn prepare_staging_dir(ctx: &mut InstallContext) -> Result<(), StepError> {
    let dir = ctx.staging_dir().to_path_buf();
    let subject = dir.display().to_string();

    if dir.is_dir() {
        return ctx.record(
            Stage::Prepare,
            subject,
            InstallationOutcome::AlreadySatisfied,
        );
    }

    println!("Creating staging directory {}", dir.display());
    match std::fs::create_dir_all(&dir) {
        Ok(()) => ctx.record(Stage::Prepare, subject, InstallationOutcome::Success),
        Err(e) => {
            let error = StepError::DirectoryCreationFailure {
                path: dir,
                reason: e.to_string(),
            };
            Err(ctx.record_fatal(Stage::Prepare, subject, error))
        }
    }
}
