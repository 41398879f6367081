//! Archive expander: unpack the dependencies zip and copy the runtime
//! libraries for this architecture into staging

use std::fs::File;
use std::path::Path;

use crate::context::InstallContext;
use crate::manifest::ArchiveSpec;
use crate::outcome::{InstallationOutcome, Stage, StepError};

/// Expand the archive (unless already expanded) and copy the allow-listed entries
pub fn expand_archive(ctx: &mut InstallContext, layout: &ArchiveSpec) -> Result<(), StepError> {
    let archive_path = ctx.staged(&layout.archive_name);
    let extract_dir = ctx.staged(&layout.extract_dir_name);

    ctx.progress()
        .report(&format!("Expanding {}...", layout.archive_name), 35);

    // An existing directory counts as expanded, even one left half-written
    let outcome = if extract_dir.exists() {
        InstallationOutcome::AlreadySatisfied
    } else {
        match extract_zip(&archive_path, &extract_dir) {
            Ok(count) => {
                log::info!("Extracted {} entries into {}", count, extract_dir.display());
                InstallationOutcome::Success
            }
            Err(reason) => InstallationOutcome::Failed(StepError::ExtractionFailure {
                archive: layout.archive_name.clone(),
                reason,
            }),
        }
    };
    ctx.record(Stage::Expand, &layout.archive_name, outcome)?;

    let source_dir = extract_dir.join(&layout.subdirectory);
    for name in &layout.entries {
        let dest = ctx.staged(name);
        let outcome = if dest.exists() {
            InstallationOutcome::AlreadySatisfied
        } else {
            match std::fs::copy(source_dir.join(name), &dest) {
                Ok(_) => InstallationOutcome::Success,
                Err(e) => InstallationOutcome::Failed(StepError::CopyFailure {
                    name: name.clone(),
                    reason: e.to_string(),
                }),
            }
        };
        ctx.record(Stage::Expand, name, outcome)?;
    }

    Ok(())
}

/// Extract a zip archive into `dest`, returning the number of files written
fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, String> {
    let file = File::open(archive_path)
        .map_err(|e| format!("cannot open {}: {}", archive_path.display(), e))?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| format!("zip read error: {}", e))?;

    std::fs::create_dir_all(dest)
        .map_err(|e| format!("cannot create directory {}: {}", dest.display(), e))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("zip entry error: {}", e))?;

        // Skip entries that would escape the destination
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| format!("cannot create directory {}: {}", outpath.display(), e))?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create directory {}: {}", parent.display(), e))?;
            }

            let mut outfile = File::create(&outpath)
                .map_err(|e| format!("cannot create {}: {}", outpath.display(), e))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| format!("write error for {}: {}", outpath.display(), e))?;
            written += 1;
        }
    }

    Ok(written)
}
