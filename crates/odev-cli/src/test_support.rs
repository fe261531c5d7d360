use anyhow::{Result, bail};
use odev_core::Reporter;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted answer to the next prompt.
#[derive(Debug, Clone)]
pub(crate) enum Answer {
    Yes,
    No,
    Text(&'static str),
}

/// Fake terminal: replays scripted answers and records every prompt and message.
#[derive(Default)]
pub(crate) struct ScriptedReporter {
    answers: Mutex<VecDeque<Answer>>,
    prompts: Mutex<Vec<String>>,
    confirm_defaults: Mutex<Vec<(String, bool)>>,
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl ScriptedReporter {
    pub(crate) fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// `(prompt, default)` for every yes/no question asked.
    pub(crate) fn confirm_defaults(&self) -> Vec<(String, bool)> {
        self.confirm_defaults.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self, level: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub(crate) fn remaining_answers(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, prompt: &str) -> Result<Answer> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("no scripted answer for prompt: {prompt}"),
        }
    }

    fn push(&self, level: &'static str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

impl Reporter for ScriptedReporter {
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

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.confirm_defaults
            .lock()
            .unwrap()
            .push((prompt.to_string(), default));
        match self.next(prompt)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            Answer::Text(text) => bail!("expected yes/no for '{prompt}', scripted '{text}'"),
        }
    }

    fn prompt_choice(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text.to_string()),
            other => bail!("expected text for '{prompt}', scripted {other:?}"),
        }
    }

    fn prompt_text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text("") => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text.to_string()),
            other => bail!("expected text for '{prompt}', scripted {other:?}"),
        }
    }
}
