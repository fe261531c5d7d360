use anyhow::Result;
use dialoguer::console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use odev_core::Reporter;

/// Interactive terminal: styled messages, prompts rendered on stderr.
pub struct TerminalReporter {
    theme: ColorfulTheme,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TerminalReporter {
    fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    fn warn(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), style(message).yellow());
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red().bold(), style(message).red());
    }

    fn success(&self, message: &str) {
        println!("{} {}", style("✔").green().bold(), message);
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    /// The first line is the question; any further lines are listed above it.
    fn prompt_choice(&self, prompt: &str) -> Result<String> {
        let mut lines = prompt.lines();
        let question = lines.next().unwrap_or_default();
        let term = Term::stderr();
        for line in lines {
            term.write_line(&format!("  {}", style(line).dim()))?;
        }
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?)
    }

    fn prompt_text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }
}
