use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use recipe_finder_core::models::FilterKind;

use crate::app::{search_error_message, App, AppState, FormField, SearchStatus, EMPTY_RESULTS_MESSAGE};
use crate::ui::styles::Palette;

use super::{recipe_list_item, render_recipe_detail};

pub fn render(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    render_form(frame, app, p, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_results(frame, app, p, columns[0]);
    render_recipe_detail(frame, app, p, app.selected_recipe(), columns[1]);
}

fn render_form(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let editing = app.state == AppState::EditingQuery;
    let query_focused = app.focus == FormField::Query;
    let cursor = if editing { "▌" } else { "" };

    let query_line = Line::from(vec![
        Span::styled(
            "Ingredients: ",
            if query_focused {
                p.highlight_style()
            } else {
                p.muted_style()
            },
        ),
        Span::styled(format!("{}{}", app.query, cursor), p.input_style(editing)),
    ]);

    let mut filter_spans = Vec::new();
    for (field, kind) in [
        (FormField::Diet, FilterKind::Diet),
        (FormField::Meal, FilterKind::Meal),
        (FormField::Cuisine, FilterKind::Cuisine),
    ] {
        let focused = app.focus == field;
        let value = app.filters.get(kind).unwrap_or("Any");
        filter_spans.push(Span::styled(
            format!("{}: ", kind.title()),
            if focused {
                p.highlight_style()
            } else {
                p.muted_style()
            },
        ));
        let value_style = if focused {
            p.selected_style()
        } else {
            p.list_item_style()
        };
        filter_spans.push(Span::styled(format!("‹ {} ›", value), value_style));
        filter_spans.push(Span::raw("   "));
    }

    let block = Block::default()
        .title(" Find Recipes ")
        .title_style(p.title_style())
        .borders(Borders::ALL)
        .border_style(p.border_style(app.focus != FormField::Results));

    let paragraph = Paragraph::new(vec![query_line, Line::from(filter_spans)]).block(block);
    frame.render_widget(paragraph, area);
}

fn render_results(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let focused = app.focus == FormField::Results;
    let block = Block::default()
        .title(format!(" Results ({}) ", app.results.len()))
        .title_style(p.title_style())
        .borders(Borders::ALL)
        .border_style(p.border_style(focused));

    let message = match &app.search_status {
        SearchStatus::Idle => Some(Line::from(Span::styled(
            "Press / to type ingredients, Enter to search",
            p.muted_style(),
        ))),
        SearchStatus::Loading => Some(Line::from(Span::styled(
            "Searching for recipes...",
            p.highlight_style(),
        ))),
        SearchStatus::Failed(e) => Some(Line::from(Span::styled(
            search_error_message(e),
            p.error_style(),
        ))),
        SearchStatus::Loaded if app.results.is_empty() => Some(Line::from(Span::styled(
            EMPTY_RESULTS_MESSAGE,
            p.muted_style(),
        ))),
        SearchStatus::Loaded => None,
    };

    if let Some(message) = message {
        let paragraph = Paragraph::new(message)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .results
        .iter()
        .enumerate()
        .map(|(i, recipe)| {
            recipe_list_item(p, recipe, app.is_saved(&recipe.id), i == app.result_selection)
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(app.result_selection));
    frame.render_stateful_widget(list, area, &mut state);
}
