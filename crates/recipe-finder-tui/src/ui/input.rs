//! Keyboard input handling for the TUI.
//!
//! Translates key events into `App` state changes. Overlays (help,
//! ingredients, quit confirmation) and query editing capture all keys while
//! they are open.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, FormField, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ShowingIngredients => {
            handle_ingredients_input(app, key);
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::EditingQuery => {
            handle_query_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Search;
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Favorites;
        }
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('s') => app.toggle_selected_favorite(),
        KeyCode::Char('i') => app.show_ingredients(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        _ => match app.current_tab {
            Tab::Search => handle_search_tab_input(app, key),
            Tab::Favorites => handle_favorites_tab_input(app, key),
        },
    }

    Ok(false)
}

fn handle_search_tab_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('/') => {
            app.focus = FormField::Query;
            app.state = AppState::EditingQuery;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
        }
        KeyCode::Left | KeyCode::Right => {
            let forward = key.code == KeyCode::Right;
            if let Some(kind) = app.focus.filter_kind() {
                app.cycle_filter(kind, forward);
            } else if app.focus != FormField::Query {
                app.current_tab = app.current_tab.next();
            }
        }
        KeyCode::Enter => {
            if app.focus == FormField::Query && app.query.trim().is_empty() {
                app.state = AppState::EditingQuery;
            } else if app.focus == FormField::Results {
                app.show_ingredients();
            } else {
                app.submit_search();
            }
        }
        KeyCode::Esc => {
            app.focus = FormField::Query;
        }
        _ => {}
    }
}

fn handle_favorites_tab_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_favorite(),
        KeyCode::Enter => app.show_ingredients(),
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            app.current_tab = app.current_tab.next();
        }
        _ => {}
    }
}

fn handle_query_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.submit_search();
        }
        KeyCode::Tab => {
            app.state = AppState::Normal;
            app.focus = app.focus.next();
        }
        KeyCode::Backspace => {
            app.query.pop();
        }
        KeyCode::Char(c) => app.push_query_char(c),
        _ => {}
    }
}

fn handle_ingredients_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q') | KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Up | KeyCode::Char('k') => app.scroll_ingredients(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_ingredients(1),
        _ => {}
    }
}
