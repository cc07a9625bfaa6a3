//! flashdeck TUI
//!
//! Terminal user interface for reviewing flashcards.
//!
//! ## Screens
//!
//! - Cards: due and all cards in two tabs, with the selected card's details
//! - Review: question side, answer side, rating
//! - Statistics: totals, mastery and rating distribution
//!
//! Screen changes go through the navigator, so a finished review or an
//! expired session moves the UI the same way it moves any other frontend.
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection up/down
//! - Tab: Switch between due and all cards
//! - Enter/r: Review the selected card
//! - Space: Flip the card
//! - 1-4: Rate (Hard, Good, Easy, Perfect)
//! - s: Statistics
//! - R: Refresh
//! - q: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flashdeck_core::card_sync::CARDS_KEY;
use flashdeck_core::{
    AppContext, Config, Query, Rating, ReviewPhase, ReviewSession, ReviewState, Route,
};

use app::{App, Screen};

/// Run the TUI application
pub async fn run(config: Config) -> Result<()> {
    // File-based, only if FLASHDECK_LOG is set
    init_tui_logging(&config);

    let ctx = AppContext::open_with_config(config)?;
    if !ctx.is_authenticated() {
        bail!("Not logged in. Run `flashdeck login <email>` first.");
    }
    let palette = ctx
        .config()
        .color_theme
        .palette(ctx.config().theme_mode);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(palette);
    let result = run_app(&mut terminal, &mut app, &ctx).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    ctx.teardown();
    if let Some(message) = app.exit_message.take() {
        eprintln!("{}", message);
    }
    result
}

/// The review being shown and its state feed
struct ActiveReview {
    session: Arc<ReviewSession>,
    rx: watch::Receiver<ReviewState>,
}

/// What woke the event loop
enum LoopEvent {
    Due,
    All,
    Statistics,
    Route,
    Review(ReviewState),
    Tick,
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ctx: &AppContext,
) -> Result<()> {
    let due = ctx.cards().due_cards();
    let all = ctx.cards().all_cards();
    let stats = ctx.statistics();

    // Subscribing keeps the lists refreshing in the background after
    // every invalidation
    let mut due_rx = due.subscribe();
    let mut all_rx = all.subscribe();
    let mut stats_rx = stats.subscribe();
    let mut route_rx = ctx.navigator().subscribe();
    let mut review: Option<ActiveReview> = None;

    spawn_fetch(&due);
    spawn_fetch(&all);
    app.set_due(&due.state());
    app.set_all(&all.state());

    loop {
        // Check for status message timeout
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if app.should_quit {
            return Ok(());
        }

        let event = tokio::select! {
            biased;

            Ok(()) = route_rx.changed() => LoopEvent::Route,
            state = next_review_state(&mut review) => LoopEvent::Review(state),
            Ok(()) = due_rx.changed() => LoopEvent::Due,
            Ok(()) = all_rx.changed() => LoopEvent::All,
            Ok(()) = stats_rx.changed() => LoopEvent::Statistics,
            _ = tokio::time::sleep(Duration::from_millis(50)) => LoopEvent::Tick,
        };

        match event {
            LoopEvent::Due => {
                let state = due_rx.borrow_and_update().clone();
                app.set_due(&state);
            }
            LoopEvent::All => {
                let state = all_rx.borrow_and_update().clone();
                app.set_all(&state);
            }
            LoopEvent::Statistics => {
                let state = stats_rx.borrow_and_update().clone();
                app.set_statistics(&state);
            }
            LoopEvent::Route => {
                let route = *route_rx.borrow_and_update();
                on_route(app, ctx, route, &mut review, &stats);
            }
            LoopEvent::Review(state) => app.set_review(state),
            LoopEvent::Tick => {
                // Check for terminal events (non-blocking)
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind == KeyEventKind::Press {
                            handle_key(app, ctx, review.as_ref(), &stats, key);
                        }
                    }
                }
            }
        }
    }
}

/// Next state of the active review; pending while there is none
async fn next_review_state(review: &mut Option<ActiveReview>) -> ReviewState {
    match review {
        Some(active) => {
            if active.rx.changed().await.is_err() {
                return std::future::pending().await;
            }
            let state = active.rx.borrow_and_update().clone();
            state
        }
        None => std::future::pending().await,
    }
}

/// Load `query` in the background; results arrive through its subscribers
fn spawn_fetch<T: Clone + Send + Sync + 'static>(query: &Query<T>) {
    let query = query.clone();
    tokio::spawn(async move {
        if let Err(e) = query.fetch().await {
            warn!(key = %query.key(), error = %e, "Background fetch failed");
        }
    });
}

/// Follow a navigation made by the user, a finished review or the HTTP layer
fn on_route(
    app: &mut App,
    ctx: &AppContext,
    route: Route,
    review: &mut Option<ActiveReview>,
    stats: &Query<flashdeck_core::Statistics>,
) {
    if route == Route::Login {
        app.quit_with("Session expired. Log in again with `flashdeck login`.");
        return;
    }
    let Some(screen) = Screen::for_route(route) else {
        return;
    };

    if let Some(finished) = review.take() {
        match finished.session.phase() {
            ReviewPhase::Done => app.set_status("Review saved"),
            ReviewPhase::NotFound => app.set_error("Card not found"),
            _ => {}
        }
    }

    app.show(screen);
    match route {
        Route::Review(id) => {
            let session = Arc::new(ctx.review_session(id));
            app.set_review(session.state());
            let rx = session.subscribe();

            let loader = Arc::clone(&session);
            tokio::spawn(async move {
                loader.load().await;
            });
            *review = Some(ActiveReview { session, rx });
        }
        Route::Statistics => {
            app.set_statistics(&stats.state());
            spawn_fetch(stats);
        }
        _ => {}
    }
    info!(%route, "Screen changed");
}

fn handle_key(
    app: &mut App,
    ctx: &AppContext,
    review: Option<&ActiveReview>,
    stats: &Query<flashdeck_core::Statistics>,
    key: KeyEvent,
) {
    // If error modal is showing, any key dismisses it
    if app.has_error() {
        app.clear_error();
        return;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') if app.screen == Screen::Cards => app.should_quit = true,
        KeyCode::Char('?') => app.toggle_help(),
        _ => match app.screen {
            Screen::Cards => handle_cards_key(app, ctx, key.code),
            Screen::Review => handle_review_key(ctx, review, key.code),
            Screen::Statistics => handle_statistics_key(app, ctx, stats, key.code),
        },
    }
}

fn handle_cards_key(app: &mut App, ctx: &AppContext, code: KeyCode) {
    // Handle 'gg' sequence
    if code == KeyCode::Char('g') {
        if let Some(time) = app.pending_g.take() {
            if time.elapsed() < Duration::from_millis(500) {
                app.move_to_first();
                return;
            }
        }
        app.pending_g = Some(std::time::Instant::now());
        return;
    }
    app.pending_g = None;

    match code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('G') => app.move_to_last(),
        KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => app.switch_tab(),
        KeyCode::Enter | KeyCode::Char('r') => {
            if let Some(card) = app.selected_card() {
                ctx.navigate(Route::Review(card.id));
            }
        }
        KeyCode::Char('s') => {
            ctx.navigate(Route::Statistics);
        }
        KeyCode::Char('R') => {
            ctx.queries().invalidate(CARDS_KEY);
            app.set_status("Refreshing...");
        }
        _ => {}
    }
}

fn handle_review_key(ctx: &AppContext, review: Option<&ActiveReview>, code: KeyCode) {
    let Some(active) = review else {
        return;
    };

    match code {
        KeyCode::Esc | KeyCode::Char('q') => {
            ctx.navigate(Route::Cards);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let session = Arc::clone(&active.session);
            let revealed = session.state().is_revealed();
            // Enter only turns the card over, Space flips both ways
            if revealed && code == KeyCode::Enter {
                return;
            }
            tokio::spawn(async move {
                if revealed {
                    session.hide().await;
                } else {
                    session.reveal().await;
                }
            });
        }
        KeyCode::Char(c @ '1'..='4') => {
            let Some(rating) = c
                .to_digit(10)
                .and_then(|d| Rating::try_from(d as u8).ok())
            else {
                return;
            };
            let session = Arc::clone(&active.session);
            tokio::spawn(async move {
                session.submit(rating).await;
            });
        }
        _ => {}
    }
}

fn handle_statistics_key(
    app: &mut App,
    ctx: &AppContext,
    stats: &Query<flashdeck_core::Statistics>,
    code: KeyCode,
) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
            ctx.navigate(Route::Cards);
        }
        KeyCode::Char('R') => {
            let refetch = stats.refetch();
            tokio::spawn(async move {
                let _ = refetch.await;
            });
            app.set_status("Refreshing...");
        }
        _ => {}
    }
}

/// Initialize file-based logging for the TUI
///
/// Logging is only enabled if FLASHDECK_LOG is set. Logs go to the
/// configured log file or `debug.log` in the data directory, since stdout
/// belongs to the terminal UI.
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("FLASHDECK_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "flashdeck_core={},flashdeck_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
