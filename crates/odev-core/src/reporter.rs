use anyhow::Result;

/// User-facing output and interactive prompts.
///
/// Negotiation logic only talks to the terminal through this trait, so a
/// scripted implementation can drive every decision path in tests.
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);

    /// Yes/no question. Blank input selects `default`.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Free-form choice with no default; blank input returns an empty string.
    fn prompt_choice(&self, prompt: &str) -> Result<String>;

    /// Free-form text with an optional default shown to the user.
    fn prompt_text(&self, prompt: &str, default: Option<&str>) -> Result<String>;
}
