//! User interaction seam for the wizard

use anyhow::Result;

/// Severity of a message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Everything the wizard needs from a terminal.
///
/// Implementations return [`crate::ProvisionError::Cancelled`] (wrapped in
/// `anyhow::Error`) when the user aborts a prompt.
pub trait Prompter {
    fn intro(&mut self, title: &str) -> Result<()>;

    fn outro(&mut self, message: &str) -> Result<()>;

    fn log(&mut self, level: LogLevel, message: &str) -> Result<()>;

    /// Free text; an empty answer yields `default`
    fn input(&mut self, prompt: &str, default: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Pick one of `items`, returning its index
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Begin a long-running step
    fn start_task(&mut self, message: &str) -> Result<()> {
        self.info(message)
    }

    /// End the step started by [`Prompter::start_task`]
    fn finish_task(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    fn info(&mut self, message: &str) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    fn success(&mut self, message: &str) -> Result<()> {
        self.log(LogLevel::Success, message)
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        self.log(LogLevel::Warning, message)
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.log(LogLevel::Error, message)
    }
}
