//! Interactive prompting used by `init`
//!
//! Every prompt returns `Ok(None)` when the user backs out, so callers can
//! tell cancellation apart from a real failure.

use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::container::validate_name;
use crate::error::{NookError, Result};

pub trait Prompter {
    /// Ask for a container name, pre-filled with `suggested`
    fn container_name(&self, suggested: Option<&str>) -> Result<Option<String>>;

    /// Yes/no question
    fn confirm(&self, question: &str, default: bool) -> Result<Option<bool>>;
}

/// Terminal prompts via dialoguer
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn container_name(&self, suggested: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt("Container name")
            .validate_with(|name: &String| validate_name(name).map_err(|e| e.to_string()));
        if let Some(suggested) = suggested {
            input = input.default(suggested.to_string());
        }

        cancellable(input.interact_text())
    }

    fn confirm(&self, question: &str, default: bool) -> Result<Option<bool>> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact_opt();
        cancellable(answer).map(Option::flatten)
    }
}

fn cancellable<T>(result: dialoguer::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(prompt_error(e)),
    }
}

fn prompt_error(e: dialoguer::Error) -> NookError {
    NookError::Prompt(e.to_string())
}
