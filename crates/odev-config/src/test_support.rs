use anyhow::{Result, bail};
use odev_core::Reporter;
use std::sync::Mutex;

/// Non-interactive reporter that records everything it is told.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub(crate) fn errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == "error")
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn push(&self, level: &'static str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }

    fn success(&self, message: &str) {
        self.push("success", message);
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        bail!("unexpected confirmation prompt: {prompt}")
    }

    fn prompt_choice(&self, prompt: &str) -> Result<String> {
        bail!("unexpected choice prompt: {prompt}")
    }

    fn prompt_text(&self, prompt: &str, _default: Option<&str>) -> Result<String> {
        bail!("unexpected text prompt: {prompt}")
    }
}
