//! Tab content. Both tabs share the recipe list row and detail panel.

pub mod favorites;
pub mod search;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};

use recipe_finder_core::utils::truncate_string;
use recipe_finder_core::Recipe;

use crate::app::{save_button_label, App};
use crate::ui::styles::Palette;

/// Width of the label column in recipe lists
const LABEL_WIDTH: usize = 36;

/// One row of a recipe list, with the saved marker
pub(crate) fn recipe_list_item<'a>(
    p: &Palette,
    recipe: &Recipe,
    saved: bool,
    selected: bool,
) -> ListItem<'a> {
    let marker = if saved { "★ " } else { "  " };
    let line = Line::from(vec![
        Span::styled(marker, p.success_style()),
        Span::raw(format!(
            "{:<width$} ",
            truncate_string(&recipe.label, LABEL_WIDTH),
            width = LABEL_WIDTH
        )),
        Span::styled(recipe.calories_display(), p.muted_style()),
    ]);

    let style = if selected {
        p.selected_style()
    } else {
        p.list_item_style()
    };
    ListItem::new(line).style(style)
}

pub(crate) fn render_recipe_detail(
    frame: &mut Frame,
    app: &App,
    p: &Palette,
    recipe: Option<&Recipe>,
    area: Rect,
) {
    let (title, lines) = match recipe {
        Some(recipe) => {
            let saved = app.is_saved(&recipe.id);
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Calories:  ", p.highlight_style()),
                    Span::raw(format!("{} per serving", recipe.calories_display())),
                ]),
                Line::from(vec![
                    Span::styled("Cook time: ", p.highlight_style()),
                    Span::raw(recipe.cook_time.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Recipe:    ", p.highlight_style()),
                    Span::styled(recipe.url.clone(), p.muted_style()),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::raw("["),
                    Span::styled(format!(" {} ", save_button_label(saved)), p.button_style(saved)),
                    Span::raw("]  "),
                    Span::styled("[s] toggle  [i] ingredients", p.muted_style()),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Ingredients ({})", recipe.ingredient_lines.len()),
                    p.title_style(),
                )),
            ];
            lines.extend(
                recipe
                    .ingredient_lines
                    .iter()
                    .map(|ingredient| Line::from(format!("  • {}", ingredient))),
            );
            (format!(" {} ", recipe.label), lines)
        }
        None => (
            " No Recipe Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a recipe from the list",
                p.muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(p.title_style())
        .borders(Borders::ALL)
        .border_style(p.border_style(false));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
