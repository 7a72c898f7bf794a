//! Colour palettes for the light and dark themes.

use ratatui::style::Color;

use crate::fields::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub error_bg: Color,
}

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(245, 245, 245),
    fg: Color::Rgb(30, 30, 30),
    accent: Color::Rgb(52, 101, 164),
    muted: Color::Rgb(140, 140, 140),
    highlight_bg: Color::Rgb(210, 225, 245),
    highlight_fg: Color::Rgb(20, 20, 20),
    error_bg: Color::Rgb(180, 40, 40),
};

pub const DARK: Palette = Palette {
    bg: Color::Rgb(24, 24, 28),
    fg: Color::Rgb(225, 225, 225),
    accent: Color::Rgb(255, 215, 0),
    muted: Color::Rgb(110, 110, 110),
    highlight_bg: Color::Rgb(60, 60, 70),
    highlight_fg: Color::White,
    error_bg: Color::Rgb(114, 0, 0),
};

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => LIGHT,
        Theme::Dark => DARK,
    }
}
