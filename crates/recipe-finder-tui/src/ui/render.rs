use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, Tab};

use super::styles::{self, Palette};
use super::tabs::{favorites, search};

pub fn render(frame: &mut Frame, app: &App) {
    let p = styles::palette(app.theme);

    frame.render_widget(Block::default().style(p.base_style()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, p, chunks[0]);
    render_tabs(frame, app, p, chunks[1]);
    render_main_content(frame, app, p, chunks[2]);
    render_status_bar(frame, app, p, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, p),
        AppState::ShowingIngredients => render_ingredients_overlay(frame, app, p),
        AppState::ConfirmingQuit => render_quit_overlay(frame, p),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let title = "  Recipe Finder";
    let right = format!("{} theme  [t] toggle  [?] Help", app.theme);

    let title_line = Line::from(vec![
        Span::styled(title, p.title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right.chars().count() + 2),
        )),
        Span::styled(right, p.muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(p.muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in [Tab::Search, Tab::Favorites].into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", p.muted_style()));
        }
        spans.push(Span::styled(
            format!("[{}] {}", i + 1, tab.title()),
            p.tab_style(app.current_tab == tab),
        ));
    }

    if !app.favorites.is_empty() {
        spans.push(Span::styled(
            format!("  ({} saved)", app.favorites.len()),
            p.muted_style(),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(p.muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    match app.current_tab {
        Tab::Search => search::render(frame, app, p, area),
        Tab::Favorites => favorites::render(frame, app, p, area),
    }
}

fn shortcuts(app: &App) -> &'static str {
    match (app.state, app.current_tab) {
        (AppState::EditingQuery, _) => "[Enter] search | [Esc] done",
        (_, Tab::Search) => "[/] query | [Tab] field | [s]ave | [i]ngredients | [q]uit",
        (_, Tab::Favorites) => "[s] toggle | [d]elete | [i]ngredients | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let left_text = match (&app.status_message, app.is_loading()) {
        (Some(msg), _) => format!(" {} ", msg),
        (None, true) => " Loading... ".to_string(),
        (None, false) => format!(" {} saved ", app.favorites.len()),
    };
    let right_text = format!(" {} ", shortcuts(app));

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, p.muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, p.muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(p.status_bar_style()),
        area,
    );
}

fn help_line<'a>(p: &Palette, key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), p.help_key_style()),
        Span::styled(desc, p.help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, p: &Palette) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Recipe Finder", p.title_style())),
        Line::from(Span::styled(format!("  version {}", version), p.muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", p.highlight_style())),
        help_line(p, "1/2", "Search / Favorites tab"),
        help_line(p, "Tab", "Next search field"),
        help_line(p, "↑/↓", "Move through the list"),
        help_line(p, "←/→", "Change the focused filter"),
        help_line(p, "Esc", "Back to the query"),
        Line::from(""),
        Line::from(Span::styled(" Actions", p.highlight_style())),
        help_line(p, "/", "Type ingredients"),
        help_line(p, "Enter", "Search"),
        help_line(p, "s", "Save or unsave recipe"),
        help_line(p, "i", "Show ingredients"),
        help_line(p, "d / Del", "Remove from favorites"),
        help_line(p, "t", "Toggle light/dark theme"),
        help_line(p, "q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", p.muted_style()),
            Span::styled("?", p.help_key_style()),
            Span::styled(" or ", p.muted_style()),
            Span::styled("Esc", p.help_key_style()),
            Span::styled(" to close", p.muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_style(true))
        .style(p.base_style());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_ingredients_overlay(frame: &mut Frame, app: &App, p: &Palette) {
    let Some(recipe) = app.selected_recipe() else {
        return;
    };

    let outer = frame.area();
    let area = centered_rect_fixed(
        outer.width.saturating_sub(10).min(70),
        outer.height.saturating_sub(6).min(24),
        outer,
    );
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = recipe
        .ingredient_lines
        .iter()
        .skip(app.ingredients_scroll)
        .map(|ingredient| Line::from(format!(" • {}", ingredient)))
        .collect();
    if recipe.ingredient_lines.is_empty() {
        lines.push(Line::from(Span::styled(
            " No ingredients listed",
            p.muted_style(),
        )));
    }

    let block = Block::default()
        .title(format!(" Ingredients: {} ", recipe.label))
        .title_style(p.title_style())
        .title_bottom(Line::from(Span::styled(
            " ↑/↓ scroll  Esc close ",
            p.muted_style(),
        )))
        .borders(Borders::ALL)
        .border_style(p.border_style(true))
        .style(p.base_style());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame, p: &Palette) {
    let area = centered_rect_fixed(40, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            p.highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", p.muted_style()),
            Span::styled("[Y]", p.help_key_style()),
            Span::styled(" to quit, ", p.muted_style()),
            Span::styled("[N]", p.help_key_style()),
            Span::styled(" to cancel", p.muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_style(true))
        .style(p.base_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
