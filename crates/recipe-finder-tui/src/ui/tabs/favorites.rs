use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles::Palette;

use super::{recipe_list_item, render_recipe_detail};

pub fn render(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_list(frame, app, p, chunks[0]);
    render_recipe_detail(frame, app, p, app.selected_recipe(), chunks[1]);
}

fn render_list(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let block = Block::default()
        .title(format!(" Saved Recipes ({}) ", app.favorites.len()))
        .title_style(p.title_style())
        .borders(Borders::ALL)
        .border_style(p.border_style(true));

    if app.favorites.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled("No saved recipes yet.", p.muted_style())),
            Line::from(Span::styled(
                "Press s on a search result to save it here.",
                p.muted_style(),
            )),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .favorites
        .iter()
        .enumerate()
        .map(|(i, recipe)| recipe_list_item(p, recipe, true, i == app.favorite_selection))
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(app.favorite_selection));
    frame.render_stateful_widget(list, area, &mut state);
}
