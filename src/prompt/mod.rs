//! User prompts
//!
//! The resolver and the generate/param workflows only see the [`Prompter`]
//! trait. The terminal implementation uses `dialoguer`; tests feed answers
//! through [`ScriptedPrompter`].

use std::collections::VecDeque;

use dialoguer::{Input, Password};

/// Prompt errors
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("terminal prompt failed: {0}")]
    Terminal(#[from] dialoguer::Error),
}

/// Source of user answers
pub trait Prompter {
    /// Ask for one line. `default` is shown in brackets after the prompt;
    /// the raw answer is returned, empty when the user just hits enter.
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String, PromptError>;

    /// Ask for a secret without echo
    fn ask_secret(&mut self, prompt: &str) -> Result<String, PromptError>;
}

/// Interactive terminal prompts
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String, PromptError> {
        let answer: String = Input::new()
            .with_prompt(format!("{} [{}]", prompt, default))
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String, PromptError> {
        let answer = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(answer)
    }
}

/// Prompter that replays canned answers
///
/// Once the answers run out every further question gets an empty answer,
/// which keeps the current value.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<(String, String)>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far as `(prompt, default)` pairs
    pub fn asked(&self) -> &[(String, String)] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str, default: &str) -> Result<String, PromptError> {
        self.asked.push((prompt.to_string(), default.to_string()));
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.asked.push((prompt.to_string(), String::new()));
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
