use ratatui::style::{Color, Modifier, Style};

use recipe_finder_core::Theme;

/// Colors for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub error: Color,
    pub muted: Color,
    pub text: Color,
    pub background: Color,
    pub highlight: Color,
    pub status_bar: Color,
}

pub const DARK: Palette = Palette {
    primary: Color::Rgb(96, 176, 128),
    secondary: Color::Rgb(96, 160, 96),
    accent: Color::Rgb(224, 160, 64),
    error: Color::Rgb(208, 80, 80),
    muted: Color::Rgb(128, 128, 128),
    text: Color::Rgb(230, 230, 230),
    background: Color::Rgb(24, 24, 28),
    highlight: Color::Rgb(48, 56, 52),
    status_bar: Color::Rgb(32, 32, 40),
};

pub const LIGHT: Palette = Palette {
    primary: Color::Rgb(32, 120, 72),
    secondary: Color::Rgb(48, 128, 48),
    accent: Color::Rgb(176, 96, 16),
    error: Color::Rgb(176, 32, 32),
    muted: Color::Rgb(112, 112, 112),
    text: Color::Rgb(24, 24, 24),
    background: Color::Rgb(250, 248, 244),
    highlight: Color::Rgb(220, 232, 222),
    status_bar: Color::Rgb(228, 226, 220),
};

pub fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}

impl Palette {
    pub fn base_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.highlight)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn list_item_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn tab_style(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(self.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            self.muted_style()
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.primary)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn input_style(&self, editing: bool) -> Style {
        if editing {
            Style::default().fg(self.accent)
        } else {
            self.list_item_style()
        }
    }

    /// Favorite button: filled when saved
    pub fn button_style(&self, saved: bool) -> Style {
        if saved {
            Style::default()
                .fg(self.background)
                .bg(self.secondary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
        }
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.status_bar).fg(self.text)
    }

    pub fn help_key_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn help_desc_style(&self) -> Style {
        Style::default().fg(self.text)
    }
}
