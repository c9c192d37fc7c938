//! Shared styles for the TUI.

use crate::app::state::theme::ThemePreference;
use ratatui::style::{Color, Modifier, Style};
use std::sync::{OnceLock, PoisonError, RwLock};

/// Runtime theme palette used by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePalette {
    pub border: Color,
    pub focused_border: Color,
    pub title: Color,
    pub dim: Color,
    pub text: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub link: Color,
    pub inline_code_fg: Color,
    pub inline_code_bg: Color,
    pub point_index: Color,
    pub button_fg: Color,
    pub button_bg: Color,
    pub danger_fg: Color,
    pub danger_bg: Color,
}

impl ThemePalette {
    pub fn light() -> Self {
        Self {
            border: Color::Rgb(150, 150, 160),
            focused_border: Color::Rgb(37, 99, 235),
            title: Color::Rgb(30, 64, 175),
            dim: Color::Rgb(110, 110, 120),
            text: Color::Rgb(30, 30, 35),
            selected_fg: Color::White,
            selected_bg: Color::Rgb(37, 99, 235),
            success: Color::Rgb(22, 130, 60),
            error: Color::Rgb(200, 30, 30),
            info: Color::Rgb(14, 116, 144),
            link: Color::Blue,
            inline_code_fg: Color::Rgb(160, 60, 20),
            inline_code_bg: Color::Rgb(235, 235, 235),
            point_index: Color::Rgb(37, 99, 235),
            button_fg: Color::White,
            button_bg: Color::Rgb(37, 99, 235),
            danger_fg: Color::White,
            danger_bg: Color::Rgb(200, 30, 30),
        }
    }

    pub fn dark() -> Self {
        Self {
            border: Color::Rgb(90, 90, 105),
            focused_border: Color::Rgb(96, 165, 250),
            title: Color::Rgb(147, 197, 253),
            dim: Color::DarkGray,
            text: Color::Rgb(220, 220, 215),
            selected_fg: Color::Black,
            selected_bg: Color::Rgb(96, 165, 250),
            success: Color::Green,
            error: Color::LightRed,
            info: Color::Cyan,
            link: Color::Cyan,
            inline_code_fg: Color::Yellow,
            inline_code_bg: Color::Rgb(40, 40, 40),
            point_index: Color::LightBlue,
            button_fg: Color::Black,
            button_bg: Color::Rgb(96, 165, 250),
            danger_fg: Color::Black,
            danger_bg: Color::LightRed,
        }
    }

    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Light => Self::light(),
            ThemePreference::Dark => Self::dark(),
        }
    }
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::light()
    }
}

static ACTIVE_THEME: OnceLock<RwLock<ThemePalette>> = OnceLock::new();

fn store() -> &'static RwLock<ThemePalette> {
    ACTIVE_THEME.get_or_init(|| RwLock::new(ThemePalette::default()))
}

fn with_palette<T>(f: impl FnOnce(&ThemePalette) -> T) -> T {
    let guard = store().read().unwrap_or_else(PoisonError::into_inner);
    f(&guard)
}

/// Installs the active runtime theme palette.
pub fn apply(palette: ThemePalette) {
    let mut guard = store().write().unwrap_or_else(PoisonError::into_inner);
    *guard = palette;
}

pub fn border() -> Style {
    with_palette(|theme| Style::default().fg(theme.border))
}

pub fn focused_border() -> Style {
    with_palette(|theme| Style::default().fg(theme.focused_border))
}

pub fn title() -> Style {
    with_palette(|theme| {
        Style::default()
            .fg(theme.title)
            .add_modifier(Modifier::BOLD)
    })
}

pub fn dim() -> Style {
    with_palette(|theme| Style::default().fg(theme.dim))
}

pub fn text() -> Style {
    with_palette(|theme| Style::default().fg(theme.text))
}

pub fn selected() -> Style {
    with_palette(|theme| Style::default().fg(theme.selected_fg).bg(theme.selected_bg))
}

pub fn success() -> Style {
    with_palette(|theme| Style::default().fg(theme.success))
}

pub fn error() -> Style {
    with_palette(|theme| Style::default().fg(theme.error))
}

pub fn info() -> Style {
    with_palette(|theme| Style::default().fg(theme.info))
}

pub fn link_color() -> Color {
    with_palette(|theme| theme.link)
}

pub fn inline_code() -> Style {
    with_palette(|theme| {
        Style::default()
            .fg(theme.inline_code_fg)
            .bg(theme.inline_code_bg)
            .add_modifier(Modifier::BOLD)
    })
}

pub fn point_index() -> Style {
    with_palette(|theme| {
        Style::default()
            .fg(theme.point_index)
            .add_modifier(Modifier::BOLD)
    })
}

pub fn button() -> Style {
    with_palette(|theme| {
        Style::default()
            .fg(theme.button_fg)
            .bg(theme.button_bg)
            .add_modifier(Modifier::BOLD)
    })
}

pub fn button_disabled() -> Style {
    with_palette(|theme| Style::default().fg(theme.dim).add_modifier(Modifier::DIM))
}

pub fn danger_button() -> Style {
    with_palette(|theme| {
        Style::default()
            .fg(theme.danger_fg)
            .bg(theme.danger_bg)
            .add_modifier(Modifier::BOLD)
    })
}
