//! Charm-style CLI prompts using cliclack

use crate::error::ProvisionError;
use crate::product::ProjectProfile;
use crate::release::HttpTransport;
use crate::wizard::{LogLevel, Outcome, Prompter, Wizard, WizardOptions};
use anyhow::Result;

/// [`Prompter`] backed by cliclack
#[derive(Default)]
pub struct ClackPrompter {
    spinner: Option<cliclack::ProgressBar>,
}

/// Escape/Ctrl+C inside a cliclack prompt surfaces as `Interrupted`
fn map_interrupt(err: std::io::Error) -> anyhow::Error {
    if err.kind() == std::io::ErrorKind::Interrupted {
        ProvisionError::Cancelled.into()
    } else {
        err.into()
    }
}

impl Prompter for ClackPrompter {
    fn intro(&mut self, title: &str) -> Result<()> {
        cliclack::intro(title)?;
        Ok(())
    }

    fn outro(&mut self, message: &str) -> Result<()> {
        cliclack::outro(message)?;
        Ok(())
    }

    fn log(&mut self, level: LogLevel, message: &str) -> Result<()> {
        match level {
            LogLevel::Info => cliclack::log::info(message)?,
            LogLevel::Success => cliclack::log::success(message)?,
            LogLevel::Warning => cliclack::log::warning(message)?,
            LogLevel::Error => cliclack::log::error(message)?,
        }
        Ok(())
    }

    fn input(&mut self, prompt: &str, default: &str) -> Result<String> {
        let mut input = cliclack::input(prompt);
        input = if default.is_empty() {
            input.required(false)
        } else {
            input.placeholder(default).default_input(default)
        };
        let value: String = input.interact().map_err(map_interrupt)?;
        Ok(value)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        cliclack::confirm(prompt)
            .initial_value(default)
            .interact()
            .map_err(map_interrupt)
    }

    fn start_task(&mut self, message: &str) -> Result<()> {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
        Ok(())
    }

    fn finish_task(&mut self, message: &str) -> Result<()> {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        }
        Ok(())
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        if items.is_empty() {
            anyhow::bail!("Nothing to select for '{}'", prompt);
        }

        // Use indices to avoid borrowing labels into the prompt
        let mut select = cliclack::select(prompt);
        for (idx, label) in items.iter().enumerate() {
            select = select.item(idx, label, "");
        }
        select.interact().map_err(map_interrupt)
    }
}

/// Run the wizard with cliclack prompts and the HTTP transport
pub async fn run<C: ProjectProfile>(config: &C, options: WizardOptions) -> Result<Outcome> {
    let transport = HttpTransport::new(config.user_agent(), config.download_timeout());
    let mut wizard = Wizard::new(config.clone(), ClackPrompter::default(), transport, options);

    let outcome = wizard.run().await?;
    if let Outcome::Cancelled = outcome {
        cliclack::outro_cancel("Setup cancelled.")?;
    }

    Ok(outcome)
}
