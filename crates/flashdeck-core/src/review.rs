//! Review flow for a single card
//!
//! ```text
//! Loading --fetch ok--> Ready --reveal--> Revealed --rate--> Submitting --ok--> Done
//!    |                    ^                  |  ^                 |
//!    +--fetch failed--> NotFound             |  +------failed-----+
//!                         Ready <--hide------+
//! ```
//!
//! Revealing and hiding wait for [`FLIP_DELAY`] so the card flip can finish
//! before the other side is shown. Ratings are only accepted in
//! `Revealed`; anything sent while a submission is in flight is ignored.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::card_sync::CardSync;
use crate::error::ApiError;
use crate::models::{Card, CardId, Rating, Review};
use crate::navigation::{Navigator, Route};

/// Time the flip animation takes before the other side is shown
pub const FLIP_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    /// Fetching the card
    Loading,
    /// Question side shown
    Ready,
    /// Answer side shown, waiting for a rating
    Revealed,
    /// Rating sent, waiting for the server
    Submitting,
    /// Rating recorded
    Done,
    /// The card could not be fetched
    NotFound,
}

/// What the review screen renders
#[derive(Debug, Clone)]
pub struct ReviewState {
    pub phase: ReviewPhase,
    pub card: Option<Card>,
    /// A flip is in progress
    pub flipping: bool,
    /// Message of the last failed submission
    pub error: Option<String>,
    pub review: Option<Review>,
}

impl ReviewState {
    fn loading() -> Self {
        Self {
            phase: ReviewPhase::Loading,
            card: None,
            flipping: false,
            error: None,
            review: None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, ReviewPhase::Revealed | ReviewPhase::Submitting)
    }
}

/// Result of [`ReviewSession::submit`]
#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(Review),
    /// Not in `Revealed` (e.g. a submission is already in flight); nothing sent
    Ignored,
    /// The server call failed; the answer is shown again for a retry
    Failed(ApiError),
}

/// State machine driving the review of one card
pub struct ReviewSession {
    card_id: CardId,
    sync: CardSync,
    navigator: Navigator,
    flip_delay: Duration,
    state: watch::Sender<ReviewState>,
}

impl ReviewSession {
    pub fn new(card_id: CardId, sync: CardSync, navigator: Navigator) -> Self {
        let (state, _) = watch::channel(ReviewState::loading());
        Self {
            card_id,
            sync,
            navigator,
            flip_delay: FLIP_DELAY,
            state,
        }
    }

    pub fn with_flip_delay(mut self, delay: Duration) -> Self {
        self.flip_delay = delay;
        self
    }

    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    pub fn state(&self) -> ReviewState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> ReviewPhase {
        self.state.borrow().phase
    }

    pub fn subscribe(&self) -> watch::Receiver<ReviewState> {
        self.state.subscribe()
    }

    /// Fetch the card; a failure ends in `NotFound` and returns to the list
    pub async fn load(&self) -> ReviewPhase {
        match self.sync.get_by_id(self.card_id).await {
            Ok(card) => {
                debug!(id = self.card_id, "Review card loaded");
                self.state.send_modify(|state| {
                    state.phase = ReviewPhase::Ready;
                    state.card = Some(card);
                });
                ReviewPhase::Ready
            }
            Err(e) => {
                warn!(id = self.card_id, error = %e, "Could not load card for review");
                self.state.send_modify(|state| state.phase = ReviewPhase::NotFound);
                // A 401 has already sent us to the login screen
                if !e.is_auth() {
                    self.navigator.navigate(Route::Cards);
                }
                ReviewPhase::NotFound
            }
        }
    }

    /// Show the answer side; returns false if the card was not in `Ready`
    pub async fn reveal(&self) -> bool {
        self.flip(ReviewPhase::Ready, ReviewPhase::Revealed).await
    }

    /// Flip back to the question side
    pub async fn hide(&self) -> bool {
        self.flip(ReviewPhase::Revealed, ReviewPhase::Ready).await
    }

    async fn flip(&self, from: ReviewPhase, to: ReviewPhase) -> bool {
        let started = self.state.send_if_modified(|state| {
            if state.phase != from || state.flipping {
                return false;
            }
            state.flipping = true;
            true
        });
        if !started {
            return false;
        }

        tokio::time::sleep(self.flip_delay).await;

        self.state.send_modify(|state| {
            state.flipping = false;
            if state.phase == from {
                state.phase = to;
            }
        });
        true
    }

    /// Submit a rating for the revealed card
    pub async fn submit(&self, rating: Rating) -> SubmitOutcome {
        let accepted = self.state.send_if_modified(|state| {
            if state.phase != ReviewPhase::Revealed || state.flipping {
                return false;
            }
            state.phase = ReviewPhase::Submitting;
            state.error = None;
            true
        });
        if !accepted {
            debug!(id = self.card_id, "Rating ignored, not waiting for one");
            return SubmitOutcome::Ignored;
        }

        match self.sync.review_card(self.card_id, rating).await {
            Ok(review) => {
                info!(id = self.card_id, "Review submitted");
                self.state.send_modify(|state| {
                    state.phase = ReviewPhase::Done;
                    state.review = Some(review.clone());
                });
                self.navigator.navigate(Route::Cards);
                SubmitOutcome::Submitted(review)
            }
            Err(e) => {
                self.state.send_modify(|state| {
                    state.phase = ReviewPhase::Revealed;
                    state.error = Some(e.user_message());
                });
                SubmitOutcome::Failed(e)
            }
        }
    }
}
