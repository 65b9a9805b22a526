use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Step counter for long multi-request jobs. The hidden tracker draws
/// nothing, for tests and non-interactive runs.
#[derive(Clone)]
pub struct ProgressTracker {
    progress_bar: Option<ProgressBar>,
    job_name: String,
}

impl ProgressTracker {
    pub fn new(total_steps: u64, job_name: &str) -> Self {
        let pb = ProgressBar::new(total_steps);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(job_name.to_string());

        Self {
            progress_bar: Some(pb),
            job_name: job_name.to_string(),
        }
    }

    pub fn hidden() -> Self {
        Self {
            progress_bar: None,
            job_name: String::new(),
        }
    }

    /// Announce the step about to run; counts steps started.
    pub fn step(&self, message: &str) {
        log::debug!("{}: {}", self.job_name, message);
        if let Some(pb) = &self.progress_bar {
            pb.set_message(message.to_string());
            pb.inc(1);
        }
    }

    pub fn finish(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn abandon(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.abandon_with_message(message.to_string());
        }
    }
}
