use std::fs::File;
use std::path::Path;

use reqwest::blocking::Client;

use super::Transport;

/// Plain HTTP(S) GET downloads
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, String> {
        log::debug!("GET {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        // A transfer that dies mid-stream leaves a truncated file behind
        let mut file = File::create(dest)
            .map_err(|e| format!("cannot create {}: {}", dest.display(), e))?;
        let written = response
            .copy_to(&mut file)
            .map_err(|e| format!("transfer interrupted: {}", e))?;

        log::debug!("wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
