//! Visual theme and styling.

use console::Style;

use crate::exec::Status;

/// Fleetcheck's visual theme.
#[derive(Debug, Clone)]
pub struct FleetTheme {
    /// Style for `okay` results and success messages (green).
    pub success: Style,
    /// Style for warnings and `skipped` results (orange).
    pub warning: Style,
    /// Style for `failed`/`error` results (red bold).
    pub error: Style,
    /// Style for `info` results (magenta).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted text (bold).
    pub highlight: Style,
    /// Style for headers (magenta bold).
    pub header: Style,
    /// Style for key labels (bold).
    pub key: Style,
}

impl Default for FleetTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            key: Style::new(),
        }
    }

    /// Style used for a result status.
    pub fn status_style(&self, status: Status) -> &Style {
        match status {
            Status::Okay => &self.success,
            Status::Failed | Status::Error => &self.error,
            Status::Skipped => &self.warning,
            Status::Info => &self.info,
        }
    }

    /// Format a status label, padded for alignment.
    pub fn format_status(&self, status: Status) -> String {
        format!(
            "{}",
            self.status_style(status)
                .apply_to(format!("{:<7}", status.as_str()))
        )
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_messages() {
        let theme = FleetTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_warning("careful"), "⚠ careful");
        assert_eq!(theme.format_error("broken"), "✗ broken");
    }

    #[test]
    fn status_labels_are_padded() {
        let theme = FleetTheme::plain();
        assert_eq!(theme.format_status(Status::Okay), "okay   ");
        assert_eq!(theme.format_status(Status::Skipped), "skipped");
    }
}
