//! Terminal output.
//!
//! Commands talk to the terminal through the [`UserInterface`] trait so they
//! can be tested against [`MockUI`]. [`TerminalUI`] is the real
//! implementation, styled by [`FleetTheme`].

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, FleetTheme};

/// Output surface used by commands.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Theme used to style lines before they are written.
    fn theme(&self) -> &FleetTheme;

    /// Show a plain message.
    fn message(&mut self, msg: &str);

    /// Show a success message.
    fn success(&mut self, msg: &str);

    /// Show a warning message.
    fn warning(&mut self, msg: &str);

    /// Show an error message. Always shown, whatever the mode.
    fn error(&mut self, msg: &str);

    /// Show a section header.
    fn show_header(&mut self, title: &str);
}

/// Create the terminal UI for the given mode.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
