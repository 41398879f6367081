use std::path::PathBuf;

use super::CommandResolver;

/// Looks commands up on the current PATH
#[derive(Debug, Default)]
pub struct PathResolver;

impl CommandResolver for PathResolver {
    fn resolve(&self, command: &str) -> Option<PathBuf> {
        match which::which(command) {
            Ok(path) => {
                log::debug!("{} resolved to {}", command, path.display());
                Some(path)
            }
            Err(e) => {
                log::debug!("{} not found on PATH: {}", command, e);
                None
            }
        }
    }
}
