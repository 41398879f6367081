//! Artifact fetcher: download the manifest into the staging directory

use crate::context::InstallContext;
use crate::manifest::ArtifactManifestEntry;
use crate::outcome::{InstallationOutcome, Stage, StepError};
use crate::platform::Transport;

const PROGRESS_START: u8 = 5;
const PROGRESS_END: u8 = 30;

/// Download every entry not already present in staging.
///
/// Presence alone counts as satisfied; there is no size or hash check, so a
/// truncated file left by an earlier failed transfer is never re-fetched.
pub fn fetch_artifacts(
    ctx: &mut InstallContext,
    transport: &dyn Transport,
    manifest: &[ArtifactManifestEntry],
) -> Result<(), StepError> {
    for (index, entry) in manifest.iter().enumerate() {
        let dest = ctx.staged(&entry.local_name);

        if dest.exists() {
            ctx.record(
                Stage::Fetch,
                &entry.local_name,
                InstallationOutcome::AlreadySatisfied,
            )?;
            continue;
        }

        ctx.progress().report_step(
            &format!("Downloading {}...", entry.local_name),
            PROGRESS_START,
            PROGRESS_END,
            index,
            manifest.len(),
        );

        let outcome = match transport.download(&entry.source_location, &dest) {
            Ok(bytes) => {
                log::debug!("{}: {} bytes", entry.local_name, bytes);
                InstallationOutcome::Success
            }
            Err(reason) => InstallationOutcome::Failed(StepError::TransferFailure {
                name: entry.local_name.clone(),
                reason,
            }),
        };
        ctx.record(Stage::Fetch, &entry.local_name, outcome)?;
    }

    Ok(())
}
