//! Application state and logic

use std::time::{Duration, Instant};

use flashdeck_core::{Card, Palette, QueryState, ReviewState, Route, Statistics};

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Cards,
    Review,
    Statistics,
}

impl Screen {
    /// Screen that renders `route`; routes without a terminal screen have none
    pub fn for_route(route: Route) -> Option<Screen> {
        match route {
            Route::Cards | Route::NewCard | Route::EditCard(_) => Some(Screen::Cards),
            Route::Review(_) => Some(Screen::Review),
            Route::Statistics => Some(Screen::Statistics),
            _ => None,
        }
    }
}

/// Tabs of the card screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTab {
    Due,
    All,
}

impl CardTab {
    pub fn toggle(self) -> Self {
        match self {
            CardTab::Due => CardTab::All,
            CardTab::All => CardTab::Due,
        }
    }

    pub fn index(self) -> usize {
        match self {
            CardTab::Due => 0,
            CardTab::All => 1,
        }
    }
}

/// Snapshot of one cached card list
#[derive(Debug, Clone, Default)]
pub struct CardList {
    pub cards: Vec<Card>,
    /// Nothing to show yet
    pub loading: bool,
    /// Background refresh of data already shown
    pub refreshing: bool,
    pub error: Option<String>,
}

impl CardList {
    pub fn from_state(state: &QueryState<Vec<Card>>) -> Self {
        Self {
            cards: state.data.clone().unwrap_or_default(),
            loading: state.data.is_none() && (state.is_loading() || state.is_fetching),
            refreshing: state.data.is_some() && state.is_fetching,
            error: state.error.clone(),
        }
    }

    /// Loaded and empty
    pub fn is_empty(&self) -> bool {
        !self.loading && self.error.is_none() && self.cards.is_empty()
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Printed after the terminal is restored
    pub exit_message: Option<String>,
    pub screen: Screen,
    pub tab: CardTab,
    pub due: CardList,
    pub all: CardList,
    /// Selected index in the current tab
    pub card_index: usize,
    /// State of the running review, if any
    pub review: Option<ReviewState>,
    pub statistics: Option<Statistics>,
    pub statistics_loading: bool,
    pub statistics_error: Option<String>,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Error shown in a modal until a key is pressed
    pub error: Option<String>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Pending 'g' keypress for gg sequence (with timestamp)
    pub pending_g: Option<Instant>,
    pub palette: Palette,
}

impl App {
    pub fn new(palette: Palette) -> Self {
        Self {
            should_quit: false,
            exit_message: None,
            screen: Screen::Cards,
            tab: CardTab::Due,
            due: CardList {
                loading: true,
                ..CardList::default()
            },
            all: CardList {
                loading: true,
                ..CardList::default()
            },
            card_index: 0,
            review: None,
            statistics: None,
            statistics_loading: false,
            statistics_error: None,
            status_message: None,
            status_message_time: None,
            error: None,
            show_help: false,
            pending_g: None,
            palette,
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Quit, leaving a message for the shell
    pub fn quit_with(&mut self, message: impl Into<String>) {
        self.should_quit = true;
        self.exit_message = Some(message.into());
    }

    pub fn current_list(&self) -> &CardList {
        match self.tab {
            CardTab::Due => &self.due,
            CardTab::All => &self.all,
        }
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.current_list().cards.get(self.card_index)
    }

    pub fn switch_tab(&mut self) {
        self.tab = self.tab.toggle();
        self.card_index = 0;
    }

    pub fn move_up(&mut self) {
        self.card_index = self.card_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.card_index + 1 < self.current_list().cards.len() {
            self.card_index += 1;
        }
    }

    /// Move selection to the first card (vim 'gg')
    pub fn move_to_first(&mut self) {
        self.card_index = 0;
    }

    /// Move selection to the last card (vim 'G')
    pub fn move_to_last(&mut self) {
        self.card_index = self.current_list().cards.len().saturating_sub(1);
    }

    pub fn set_due(&mut self, state: &QueryState<Vec<Card>>) {
        self.due = CardList::from_state(state);
        self.clamp_selection();
    }

    pub fn set_all(&mut self, state: &QueryState<Vec<Card>>) {
        self.all = CardList::from_state(state);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.current_list().cards.len();
        if self.card_index >= len {
            self.card_index = len.saturating_sub(1);
        }
    }

    pub fn set_statistics(&mut self, state: &QueryState<Statistics>) {
        if let Some(ref stats) = state.data {
            self.statistics = Some(stats.clone());
        }
        self.statistics_loading = state.data.is_none() && (state.is_loading() || state.is_fetching);
        self.statistics_error = state.error.clone();
    }

    pub fn set_review(&mut self, state: ReviewState) {
        self.review = Some(state);
    }

    pub fn show(&mut self, screen: Screen) {
        self.screen = screen;
        if screen != Screen::Review {
            self.review = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flashdeck_core::{CardStatus, ColorTheme, QueryStatus, ThemeMode};

    fn card(id: i64) -> Card {
        Card {
            id,
            word: format!("word{}", id),
            definition: "def".into(),
            example: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
            next_review: Utc::now(),
            review_count: 0,
            status: CardStatus::Learning,
        }
    }

    fn loaded(cards: Vec<Card>) -> QueryState<Vec<Card>> {
        QueryState {
            data: Some(cards),
            status: QueryStatus::Success,
            ..QueryState::default()
        }
    }

    fn app() -> App {
        App::new(ColorTheme::Default.palette(ThemeMode::Dark))
    }

    #[test]
    fn test_screen_for_route() {
        assert_eq!(Screen::for_route(Route::Cards), Some(Screen::Cards));
        assert_eq!(Screen::for_route(Route::Review(4)), Some(Screen::Review));
        assert_eq!(Screen::for_route(Route::Statistics), Some(Screen::Statistics));
        assert_eq!(Screen::for_route(Route::Login), None);
    }

    #[test]
    fn test_card_tab_toggle() {
        assert_eq!(CardTab::Due.toggle(), CardTab::All);
        assert_eq!(CardTab::All.toggle(), CardTab::Due);
    }

    #[test]
    fn test_lists_start_loading() {
        let app = app();
        assert!(app.due.loading);
        assert!(!app.due.is_empty());
    }

    #[test]
    fn test_empty_due_list() {
        let mut app = app();
        app.set_due(&loaded(vec![]));
        assert!(app.due.is_empty());
        assert!(app.selected_card().is_none());
    }

    #[test]
    fn test_selection_follows_list() {
        let mut app = app();
        app.set_due(&loaded(vec![card(1), card(2), card(3)]));

        app.move_down();
        app.move_down();
        app.move_down();
        assert_eq!(app.selected_card().map(|c| c.id), Some(3));

        // A review removed cards from the due list
        app.set_due(&loaded(vec![card(1)]));
        assert_eq!(app.selected_card().map(|c| c.id), Some(1));

        app.move_up();
        assert_eq!(app.card_index, 0);
    }

    #[test]
    fn test_switch_tab_resets_selection() {
        let mut app = app();
        app.set_due(&loaded(vec![card(1), card(2)]));
        app.set_all(&loaded(vec![card(1), card(2), card(3)]));
        app.move_to_last();
        assert_eq!(app.card_index, 1);

        app.switch_tab();
        assert_eq!(app.tab, CardTab::All);
        assert_eq!(app.card_index, 0);
        app.move_to_last();
        assert_eq!(app.selected_card().map(|c| c.id), Some(3));
    }

    #[test]
    fn test_refresh_keeps_cards_visible() {
        let mut app = app();
        let mut state = loaded(vec![card(1)]);
        state.is_fetching = true;
        app.set_all(&state);

        assert!(!app.all.loading);
        assert!(app.all.refreshing);
        assert_eq!(app.all.cards.len(), 1);
    }

    #[test]
    fn test_status_message() {
        let mut app = app();
        app.set_status("Saved");
        app.check_status_timeout();
        assert_eq!(app.status_message.as_deref(), Some("Saved"));
    }

    #[test]
    fn test_leaving_review_drops_its_state() {
        let mut app = app();
        app.review = None;
        app.show(Screen::Statistics);
        assert_eq!(app.screen, Screen::Statistics);
        assert!(app.review.is_none());
    }
}
