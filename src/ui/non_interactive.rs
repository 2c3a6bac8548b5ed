//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use anyhow::anyhow;

use crate::error::Result;

use super::{
    parse_bool, EnvdocTheme, OutputMode, ProgressSpinner, Prompt, PromptResult, PromptType,
    SpinnerHandle, UserInterface,
};

/// Prefix of environment variables that answer prompts, e.g. `ENVDOC_PROMPT_RUN_JOBS=yes`.
pub const PROMPT_ENV_PREFIX: &str = "ENVDOC_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `ENVDOC_PROMPT_*` variables or the prompt's
/// default. Spinners never draw.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: EnvdocTheme,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();
        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            theme: EnvdocTheme::detect(),
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_decorations() {
            println!("{}", self.theme.format_header(title));
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_decorations() {
            println!("  {}", self.theme.hint.apply_to(hint));
        }
    }

    fn show_command(&mut self, command: &str) {
        if self.mode.shows_status() {
            println!("  {}", self.theme.format_command(command));
        }
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        let answer = self
            .env_overrides
            .get(&env_key)
            .or(prompt.default.as_ref())
            .ok_or_else(|| {
                anyhow!(
                    "Cannot prompt for '{}' in non-interactive mode (set {})",
                    prompt.key,
                    env_key
                )
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_bool(answer)),
            PromptType::Input => PromptResult::String(answer.clone()),
        })
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
