//! Visual theme and styling.

use console::Style;

/// envdoc's visual theme.
#[derive(Debug, Clone)]
pub struct EnvdocTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warning messages (yellow).
    pub warning: Style,
    /// Error messages (red bold).
    pub error: Style,
    /// Dim/secondary text.
    pub dim: Style,
    /// Highlighted text (bold).
    pub highlight: Style,
    /// Headers (cyan bold).
    pub header: Style,
    /// Shell commands (dim italic).
    pub command: Style,
    /// Contextual hints (cyan dim).
    pub hint: Style,
}

impl Default for EnvdocTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvdocTheme {
    /// Create the default colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            command: Style::new().dim().italic(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            command: Style::new(),
            hint: Style::new(),
        }
    }

    /// Colored when the terminal allows it, plain otherwise.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a success message.
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message.
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message.
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message.
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Format a shell command line.
    pub fn format_command(&self, command: &str) -> String {
        format!("{}", self.command.apply_to(format!("$ {}", command)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}
