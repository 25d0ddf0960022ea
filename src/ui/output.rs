//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show every result, including unit output.
    Verbose,
    /// Show problems and the summary.
    #[default]
    Normal,
    /// Show the summary only.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows unit output next to each result.
    pub fn shows_unit_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Check if this mode lists individual results.
    pub fn shows_results(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_flags() {
        assert!(OutputMode::Verbose.shows_unit_output());
        assert!(!OutputMode::Normal.shows_unit_output());
        assert!(OutputMode::Normal.shows_results());
        assert!(!OutputMode::Quiet.shows_results());
    }

    #[test]
    fn output_mode_default() {
        assert_eq!(OutputMode::default(), OutputMode::Normal);
    }
}
