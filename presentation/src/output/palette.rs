//! Theme-dependent terminal colors

use colored::Color;
use medbot_domain::Theme;

/// Colors used for terminal output under a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: Color,
    pub accent: Color,
    pub code: Color,
    pub quote: Color,
    pub user: Color,
    pub assistant: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                heading: Color::BrightCyan,
                accent: Color::Cyan,
                code: Color::Yellow,
                quote: Color::BrightBlack,
                user: Color::BrightBlue,
                assistant: Color::BrightGreen,
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
            },
            Theme::Light => Self {
                heading: Color::Blue,
                accent: Color::Magenta,
                code: Color::Red,
                quote: Color::Black,
                user: Color::Blue,
                assistant: Color::Green,
                success: Color::Green,
                warning: Color::Magenta,
                error: Color::Red,
            },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}
