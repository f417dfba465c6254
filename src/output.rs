//! # Output Configuration
//!
//! Controls whether CLI output uses colors and emoji, based on terminal
//! capabilities and user preference.
//!
//! Respected signals, in priority order:
//! - the `--color=never|always|auto` CLI flag
//! - `NO_COLOR` - disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - disables colors
//! - `CLICOLOR_FORCE=1` - forces colors even in non-TTY
//! - `TERM=dumb` - disables colors
//! - TTY detection via the `console` crate

use std::env;

use clap::ValueEnum;

/// Value of the global `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve the flag against the environment.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => detect_color_support(),
        }
    }
}

/// Detect whether color output is supported based on environment.
fn detect_color_support() -> bool {
    // The presence of NO_COLOR (even empty) disables colors
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }

    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }

    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }

    console::Term::stdout().features().colors_supported()
}

/// Resolved output policy threaded through the commands.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    pub fn from_choice(choice: ColorChoice) -> Self {
        Self {
            use_color: choice.enabled(),
        }
    }

    /// Returns the emoji when colors are enabled, the plain-text
    /// alternative otherwise.
    pub fn emoji<'a>(&self, emoji: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            plain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_enables_color() {
        assert!(ColorChoice::Always.enabled());
        assert!(OutputConfig::from_choice(ColorChoice::Always).use_color);
    }

    #[test]
    fn test_never_disables_color() {
        assert!(!ColorChoice::Never.enabled());
        assert!(!OutputConfig::from_choice(ColorChoice::Never).use_color);
    }

    #[test]
    fn test_emoji_helper_follows_color_setting() {
        let color = OutputConfig { use_color: true };
        let plain = OutputConfig { use_color: false };
        assert_eq!(color.emoji("✅", "[OK]"), "✅");
        assert_eq!(plain.emoji("✅", "[OK]"), "[OK]");
    }
}
