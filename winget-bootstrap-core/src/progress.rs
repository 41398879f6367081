/// Progress callback for the installer
/// Callback receives: (status_message, percentage)
pub type ProgressCallback = Box<dyn Fn(&str, u8) + Send>;

/// Centralized progress reporting for the installation run
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    /// Reporter that prints `[pct%] message` lines
    pub fn console() -> Self {
        Self::new(None)
    }

    /// Report installation progress with message and percentage
    pub fn report(&self, message: &str, percentage: u8) {
        log::debug!("progress {}%: {}", percentage, message);

        // Report via callback or println
        if let Some(ref cb) = self.callback {
            cb(message, percentage.min(100));
        } else {
            println!("[{}%] {}", percentage.min(100), message);
        }
    }

    /// Report progress within a stage that spans `start..end` percent
    pub fn report_step(&self, message: &str, start: u8, end: u8, index: usize, total: usize) {
        let span = end.saturating_sub(start) as usize;
        let offset = if total == 0 { 0 } else { span * index / total };
        self.report(message, start.saturating_add(offset as u8));
    }
}
