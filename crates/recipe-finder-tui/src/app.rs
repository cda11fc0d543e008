//! Application state management for Recipe Finder.
//!
//! The `App` struct owns the UI state, the favorites and theme stores, and
//! the channel the background search task reports through.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use recipe_finder_core::api::RecipeSearchClient;
use recipe_finder_core::models::FilterKind;
use recipe_finder_core::{
    Config, FavoritesStore, FileStore, KeyValueStore, Recipe, SearchFilters, Theme,
    ThemePreference,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the search result channel.
/// Only one search is in flight at a time, a few slots cover late results.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for the ingredient query.
const MAX_QUERY_LENGTH: usize = 100;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Shown when a search returns no hits.
pub const EMPTY_RESULTS_MESSAGE: &str =
    "No recipes found for those ingredients. Try a different search.";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Favorites,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Search => "Search",
            Tab::Favorites => "Favorites",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Search => Tab::Favorites,
            Tab::Favorites => Tab::Search,
        }
    }
}

/// Search form field that owns keyboard focus on the Search tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Query,
    Diet,
    Meal,
    Cuisine,
    Results,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Query => FormField::Diet,
            FormField::Diet => FormField::Meal,
            FormField::Meal => FormField::Cuisine,
            FormField::Cuisine => FormField::Results,
            FormField::Results => FormField::Query,
        }
    }

    pub fn filter_kind(&self) -> Option<FilterKind> {
        match self {
            FormField::Diet => Some(FilterKind::Diet),
            FormField::Meal => Some(FilterKind::Meal),
            FormField::Cuisine => Some(FilterKind::Cuisine),
            FormField::Query | FormField::Results => None,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    EditingQuery,
    ShowingIngredients,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Progress of the most recent search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Message rendered in place of the result list when a search fails
pub fn search_error_message(error: &str) -> String {
    format!("Sorry, we couldn't fetch recipes. (Error: {})", error)
}

/// Label of the favorite button for a recipe
pub fn save_button_label(saved: bool) -> &'static str {
    if saved {
        "Saved"
    } else {
        "Save to Favorites"
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Sent from the background search task back to the main loop.
struct SearchResult {
    /// Matches `App::search_generation` unless a newer search superseded it
    generation: u64,
    outcome: std::result::Result<Vec<Recipe>, String>,
}

/// Shared handle to the persistent key-value store.
pub type SharedStore = Arc<dyn KeyValueStore>;

pub struct App {
    client: RecipeSearchClient,
    favorites_store: FavoritesStore<SharedStore>,
    theme_pref: ThemePreference<SharedStore>,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: FormField,
    pub theme: Theme,

    // Search form
    pub query: String,
    pub filters: SearchFilters,

    // Search results
    pub results: Vec<Recipe>,
    pub search_status: SearchStatus,
    pub result_selection: usize,
    search_generation: u64,

    // Favorites
    pub favorites: Vec<Recipe>,
    pub saved_ids: HashSet<String>,
    pub favorite_selection: usize,

    /// Scroll offset of the ingredients modal
    pub ingredients_scroll: usize,

    // Background task channel
    search_rx: mpsc::Receiver<SearchResult>,
    search_tx: mpsc::Sender<SearchResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create the app with favorites and theme persisted under the data directory
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");

        let store: SharedStore = Arc::new(FileStore::new(data_dir)?);
        let client = RecipeSearchClient::from_config(&config)?;
        Ok(Self::with_parts(store, client))
    }

    pub fn with_parts(store: SharedStore, client: RecipeSearchClient) -> Self {
        let favorites_store = FavoritesStore::new(Arc::clone(&store));
        let theme_pref = ThemePreference::new(store);

        let theme = theme_pref.load();
        let favorites = favorites_store.get_all();
        let saved_ids = favorites.iter().map(|r| r.id.clone()).collect();
        info!(count = favorites.len(), %theme, "Loaded favorites");

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let status_message = if client.has_api_key() {
            None
        } else {
            Some("No API key configured - set RECIPE_FINDER_API_KEY to search".to_string())
        };

        Self {
            client,
            favorites_store,
            theme_pref,

            state: AppState::Normal,
            current_tab: Tab::Search,
            focus: FormField::Query,
            theme,

            query: String::new(),
            filters: SearchFilters::default(),

            results: Vec::new(),
            search_status: SearchStatus::Idle,
            result_selection: 0,
            search_generation: 0,

            favorites,
            saved_ids,
            favorite_selection: 0,

            ingredients_scroll: 0,

            search_rx: rx,
            search_tx: tx,

            status_message,
        }
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn push_query_char(&mut self, c: char) {
        if self.query.chars().count() < MAX_QUERY_LENGTH && !c.is_control() {
            self.query.push(c);
        }
    }

    pub fn cycle_filter(&mut self, kind: FilterKind, forward: bool) {
        self.filters.cycle(kind, forward);
    }

    pub fn is_loading(&self) -> bool {
        self.search_status == SearchStatus::Loading
    }

    /// Start a search for the current query and filters in a background task.
    pub fn submit_search(&mut self) {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            self.status_message = Some("Type an ingredient to search for".to_string());
            return;
        }

        self.search_generation += 1;
        let generation = self.search_generation;
        self.search_status = SearchStatus::Loading;
        self.results.clear();
        self.result_selection = 0;
        self.status_message = None;

        let client = self.client.clone();
        let filters = self.filters.clone();
        let tx = self.search_tx.clone();
        debug!(generation, query = %query, "Starting search");

        tokio::spawn(async move {
            let outcome = client
                .search(&query, &filters)
                .await
                .map_err(|e| format!("{:#}", e));
            if let Err(e) = tx.send(SearchResult { generation, outcome }).await {
                error!(error = %e, "Failed to send search result - channel closed");
            }
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.search_rx.try_recv() {
            self.process_search_result(result);
        }
    }

    fn process_search_result(&mut self, result: SearchResult) {
        if result.generation != self.search_generation {
            debug!(
                generation = result.generation,
                current = self.search_generation,
                "Dropping stale search result"
            );
            return;
        }

        match result.outcome {
            Ok(recipes) => {
                info!(count = recipes.len(), "Search results received");
                self.results = recipes;
                self.result_selection = 0;
                self.search_status = SearchStatus::Loaded;
                if !self.results.is_empty() {
                    self.focus = FormField::Results;
                }
            }
            Err(e) => {
                warn!(error = %e, "Search failed");
                self.results.clear();
                self.search_status = SearchStatus::Failed(e);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// The list shown on the current tab
    pub fn visible_recipes(&self) -> &[Recipe] {
        match self.current_tab {
            Tab::Search => &self.results,
            Tab::Favorites => &self.favorites,
        }
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        let index = match self.current_tab {
            Tab::Search => self.result_selection,
            Tab::Favorites => self.favorite_selection,
        };
        self.visible_recipes().get(index)
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_tab {
            Tab::Search => &mut self.result_selection,
            Tab::Favorites => &mut self.favorite_selection,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_recipes().len();
        if len == 0 {
            return;
        }
        let selection = self.selection_mut();
        let next = (*selection as isize + delta).clamp(0, len as isize - 1);
        *selection = next as usize;
    }

    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let last = self.visible_recipes().len().saturating_sub(1);
        *self.selection_mut() = last;
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved_ids.contains(id)
    }

    // ------------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------------

    /// Save or unsave the selected recipe.
    pub fn toggle_selected_favorite(&mut self) {
        let Some(recipe) = self.selected_recipe().cloned() else {
            return;
        };

        match self.favorites_store.toggle(&recipe) {
            Ok(saved) => {
                if saved {
                    self.saved_ids.insert(recipe.id.clone());
                    self.status_message = Some(format!("Saved \"{}\"", recipe.label));
                } else {
                    self.saved_ids.remove(&recipe.id);
                    self.status_message = Some(format!("Removed \"{}\"", recipe.label));
                }
                self.reload_favorites();
            }
            Err(e) => {
                warn!(error = %e, id = %recipe.id, "Failed to toggle favorite");
                self.status_message = Some(format!("Couldn't update favorites: {}", e));
            }
        }
    }

    /// Remove the selected recipe from the Favorites tab.
    pub fn remove_selected_favorite(&mut self) {
        if self.current_tab != Tab::Favorites {
            return;
        }
        let Some(recipe) = self.selected_recipe().cloned() else {
            return;
        };

        match self.favorites_store.remove(&recipe.id) {
            Ok(()) => {
                self.saved_ids.remove(&recipe.id);
                self.status_message = Some(format!("Removed \"{}\"", recipe.label));
                self.reload_favorites();
            }
            Err(e) => {
                warn!(error = %e, id = %recipe.id, "Failed to remove favorite");
                self.status_message = Some(format!("Couldn't update favorites: {}", e));
            }
        }
    }

    /// Re-read favorites from the store so the list reflects what is persisted.
    pub fn reload_favorites(&mut self) {
        self.favorites = self.favorites_store.get_all();
        self.saved_ids = self.favorites.iter().map(|r| r.id.clone()).collect();
        if self.favorite_selection >= self.favorites.len() {
            self.favorite_selection = self.favorites.len().saturating_sub(1);
        }
    }

    // ------------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------------

    pub fn toggle_theme(&mut self) {
        match self.theme_pref.toggle(self.theme) {
            Ok(theme) => self.theme = theme,
            Err(e) => {
                warn!(error = %e, "Failed to persist theme");
                self.theme = self.theme.toggled();
                self.status_message = Some(format!("Theme not saved: {}", e));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------------

    pub fn show_ingredients(&mut self) {
        if self.selected_recipe().is_some() {
            self.ingredients_scroll = 0;
            self.state = AppState::ShowingIngredients;
        }
    }

    pub fn scroll_ingredients(&mut self, delta: isize) {
        let len = self
            .selected_recipe()
            .map(|r| r.ingredient_lines.len())
            .unwrap_or(0);
        let max = len.saturating_sub(1) as isize;
        self.ingredients_scroll = (self.ingredients_scroll as isize + delta).clamp(0, max) as usize;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use recipe_finder_core::theme::THEME_KEY;
    use recipe_finder_core::{MemoryStore, StorageError};

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            label: format!("Recipe {}", id),
            image: String::new(),
            url: format!("https://example.com/{}", id),
            ingredient_lines: vec!["1 egg".to_string(), "2 cups flour".to_string()],
            calories: 250.0,
            cook_time: "15 min".to_string(),
        }
    }

    fn app_with(store: Arc<MemoryStore>) -> App {
        let client = RecipeSearchClient::new(Some("test".to_string())).unwrap();
        App::with_parts(store, client)
    }

    fn app() -> App {
        app_with(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Search.next(), Tab::Favorites);
        assert_eq!(Tab::Favorites.next(), Tab::Search);
    }

    #[test]
    fn test_form_field_cycle() {
        let mut field = FormField::Query;
        for _ in 0..5 {
            field = field.next();
        }
        assert_eq!(field, FormField::Query);
        assert_eq!(FormField::Meal.filter_kind(), Some(FilterKind::Meal));
        assert_eq!(FormField::Results.filter_kind(), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            search_error_message("Rate limited"),
            "Sorry, we couldn't fetch recipes. (Error: Rate limited)"
        );
        assert_eq!(save_button_label(true), "Saved");
        assert_eq!(save_button_label(false), "Save to Favorites");
    }

    #[test]
    fn test_toggle_favorite_updates_marker_and_list() {
        let mut app = app();
        app.results = vec![recipe("a"), recipe("b")];
        app.result_selection = 1;

        app.toggle_selected_favorite();
        assert!(app.is_saved("b"));
        assert_eq!(app.favorites, vec![recipe("b")]);

        app.toggle_selected_favorite();
        assert!(!app.is_saved("b"));
        assert!(app.favorites.is_empty());
    }

    #[test]
    fn test_remove_from_favorites_tab_clears_search_marker() {
        let mut app = app();
        app.results = vec![recipe("a")];
        app.toggle_selected_favorite();
        assert!(app.is_saved("a"));

        app.current_tab = Tab::Favorites;
        app.remove_selected_favorite();
        assert!(app.favorites.is_empty());
        assert!(!app.is_saved("a"));
        assert_eq!(app.favorite_selection, 0);
    }

    #[test]
    fn test_remove_is_ignored_on_search_tab() {
        let mut app = app();
        app.results = vec![recipe("a")];
        app.toggle_selected_favorite();

        app.remove_selected_favorite();
        assert!(app.is_saved("a"));
    }

    #[test]
    fn test_favorites_loaded_at_startup() {
        let store = Arc::new(MemoryStore::new());
        {
            let favorites = FavoritesStore::new(Arc::clone(&store));
            favorites.save(&[recipe("x"), recipe("y")]).unwrap();
        }
        let app = app_with(store);
        assert_eq!(app.favorites.len(), 2);
        assert!(app.is_saved("x"));
    }

    #[test]
    fn test_toggle_failure_keeps_state() {
        let store = Arc::new(MemoryStore::unavailable());
        let mut app = app_with(store);
        app.results = vec![recipe("a")];

        app.toggle_selected_favorite();
        assert!(!app.is_saved("a"));
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Couldn't update favorites")));
    }

    #[test]
    fn test_theme_toggle_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut app = app_with(Arc::clone(&store));
        assert_eq!(app.theme, Theme::Light);

        app.toggle_theme();
        assert_eq!(app.theme, Theme::Dark);

        let reopened = app_with(store);
        assert_eq!(reopened.theme, Theme::Dark);
    }

    /// Memory store whose writes can be switched off.
    struct FlakyStore {
        inner: MemoryStore,
        writable: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if !self.writable.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("writes disabled".to_string()));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_theme_toggle_after_failed_save_follows_screen() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            writable: AtomicBool::new(false),
        });
        let client = RecipeSearchClient::new(Some("test".to_string())).unwrap();
        let mut app = App::with_parts(store.clone(), client);

        app.toggle_theme();
        assert_eq!(app.theme, Theme::Dark);
        assert!(app.status_message.is_some());
        assert_eq!(store.get_item(THEME_KEY).unwrap(), None);

        store.writable.store(true, Ordering::SeqCst);
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(store.get_item(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut app = app();
        app.results = vec![recipe("a"), recipe("b"), recipe("c")];
        app.move_selection(10);
        assert_eq!(app.result_selection, 2);
        app.move_selection(-10);
        assert_eq!(app.result_selection, 0);
        app.select_last();
        assert_eq!(app.selected_recipe().map(|r| r.id.as_str()), Some("c"));
    }

    #[test]
    fn test_empty_query_does_not_search() {
        let mut app = app();
        app.query = "   ".to_string();
        app.submit_search();
        assert_eq!(app.search_status, SearchStatus::Idle);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut app = app();
        app.search_generation = 2;
        app.search_status = SearchStatus::Loading;

        app.process_search_result(SearchResult {
            generation: 1,
            outcome: Ok(vec![recipe("old")]),
        });
        assert!(app.results.is_empty());
        assert!(app.is_loading());

        app.process_search_result(SearchResult {
            generation: 2,
            outcome: Ok(vec![recipe("new")]),
        });
        assert_eq!(app.results, vec![recipe("new")]);
        assert_eq!(app.search_status, SearchStatus::Loaded);
        assert_eq!(app.focus, FormField::Results);
    }

    #[test]
    fn test_failed_search_sets_status() {
        let mut app = app();
        app.search_generation = 1;
        app.process_search_result(SearchResult {
            generation: 1,
            outcome: Err("Server error".to_string()),
        });
        assert_eq!(
            app.search_status,
            SearchStatus::Failed("Server error".to_string())
        );
    }

    #[test]
    fn test_query_input_rejects_control_chars() {
        let mut app = app();
        app.push_query_char('e');
        app.push_query_char('\u{7}');
        app.push_query_char('g');
        assert_eq!(app.query, "eg");
    }

    #[test]
    fn test_ingredients_modal_scroll() {
        let mut app = app();
        app.show_ingredients();
        assert_eq!(app.state, AppState::Normal);

        app.results = vec![recipe("a")];
        app.show_ingredients();
        assert_eq!(app.state, AppState::ShowingIngredients);
        app.scroll_ingredients(5);
        assert_eq!(app.ingredients_scroll, 1);
    }
}
