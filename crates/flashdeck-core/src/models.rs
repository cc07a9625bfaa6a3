//! Data models for flashdeck
//!
//! Wire types for the flashcard API. Cards and reviews are owned by the
//! server; the client only holds cached copies keyed by id.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Server-side card identifier
pub type CardId = i64;

/// Learning stage of a card, assigned by the server after each review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Learning,
    Reviewing,
    Mastered,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CardStatus::Learning => "learning",
            CardStatus::Reviewing => "reviewing",
            CardStatus::Mastered => "mastered",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flashcard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    /// Front of the card
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub next_review: DateTime<Utc>,
    #[serde(default)]
    pub review_count: u32,
    pub status: CardStatus,
}

/// Reviews after which a card is considered fully learned, for progress display
pub const REVIEW_PROGRESS_TARGET: u32 = 10;

impl Card {
    /// Whether the card's next review time has passed
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// Review progress in 0.0..=1.0
    pub fn progress(&self) -> f64 {
        (self.review_count.min(REVIEW_PROGRESS_TARGET) as f64) / REVIEW_PROGRESS_TARGET as f64
    }

    /// Example text, if non-empty
    pub fn example_text(&self) -> Option<&str> {
        self.example.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Notes text, if non-empty
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Payload for creating a card
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewCard {
    pub word: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewCard {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
            example: None,
            notes: None,
        }
    }

    /// Check required fields before sending
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.word.trim().is_empty() {
            return Err(ApiError::Validation("Word is required".into()));
        }
        if self.definition.trim().is_empty() {
            return Err(ApiError::Validation("Definition is required".into()));
        }
        Ok(())
    }
}

/// Partial update of a card; unset fields are left alone by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.word.is_none()
            && self.definition.is_none()
            && self.example.is_none()
            && self.notes.is_none()
    }

    /// Build a patch holding only the fields of `edited` that differ from `original`
    pub fn diff(original: &Card, edited: &NewCard) -> Self {
        fn changed(old: Option<&str>, new: Option<&str>) -> Option<String> {
            let old = old.unwrap_or("");
            let new = new.unwrap_or("");
            (old != new).then(|| new.to_string())
        }

        Self {
            word: changed(Some(&original.word), Some(&edited.word)),
            definition: changed(Some(&original.definition), Some(&edited.definition)),
            example: changed(original.example.as_deref(), edited.example.as_deref()),
            notes: changed(original.notes.as_deref(), edited.notes.as_deref()),
        }
    }
}

/// Self-assessed recall quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    Hard = 1,
    Good = 2,
    Easy = 3,
    Perfect = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Hard, Rating::Good, Rating::Easy, Rating::Perfect];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
            Rating::Perfect => "Perfect",
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.value()
    }
}

impl TryFrom<u8> for Rating {
    type Error = ApiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Hard),
            2 => Ok(Rating::Good),
            3 => Ok(Rating::Easy),
            4 => Ok(Rating::Perfect),
            other => Err(ApiError::InvalidRating(other)),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}

/// Body of `POST /cards/{id}/review`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRequest {
    pub card_id: CardId,
    pub rating: Rating,
}

/// A recorded review, as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Absent when the server answered with the rescheduled card
    #[serde(default)]
    pub id: Option<i64>,
    pub card_id: CardId,
    #[serde(with = "timestamp")]
    pub review_date: DateTime<Utc>,
    /// Kept as a raw integer: older servers accepted a wider scale
    pub rating: u8,
    /// Days until the card is due again
    pub next_interval: i64,
}

/// Body of a successful `POST /cards/{id}/review`
///
/// Servers answer with either the recorded review or the rescheduled card.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReviewResponse {
    Review(Review),
    Card(Card),
}

impl ReviewResponse {
    /// The review the server recorded for `rating`
    pub fn into_review(self, rating: Rating, now: DateTime<Utc>) -> Review {
        match self {
            ReviewResponse::Review(review) => review,
            ReviewResponse::Card(card) => Review {
                id: None,
                card_id: card.id,
                review_date: now,
                rating: rating.value(),
                next_interval: (card.next_review.date_naive() - now.date_naive())
                    .num_days()
                    .max(0),
            },
        }
    }
}

/// Response of `POST /users/login`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body of `POST /users/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Account profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub usage_count: Option<u32>,
    #[serde(default)]
    pub is_premium: Option<bool>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable profile fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.gender.is_none()
    }
}

/// Which notifications the user wants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationTypes {
    pub new_cards: bool,
    pub study_reminders: bool,
    pub achievement_unlocked: bool,
    pub system_updates: bool,
}

impl Default for NotificationTypes {
    fn default() -> Self {
        Self {
            new_cards: true,
            study_reminders: true,
            achievement_unlocked: true,
            system_updates: false,
        }
    }
}

/// Notification preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub notification_types: NotificationTypes,
    /// Local time of day, "HH:MM"
    pub study_reminder_time: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            notification_types: NotificationTypes::default(),
            study_reminder_time: "09:00".to_string(),
        }
    }
}

impl NotificationSettings {
    /// Set a flag by its wire name, e.g. `email_notifications` or `study_reminders`
    pub fn set_flag(&mut self, name: &str, value: bool) -> Result<(), ApiError> {
        let types = &mut self.notification_types;
        let slot = match name {
            "email_notifications" | "email" => &mut self.email_notifications,
            "push_notifications" | "push" => &mut self.push_notifications,
            "new_cards" => &mut types.new_cards,
            "study_reminders" => &mut types.study_reminders,
            "achievement_unlocked" => &mut types.achievement_unlocked,
            "system_updates" => &mut types.system_updates,
            other => {
                return Err(ApiError::Validation(format!(
                    "Unknown notification setting '{}'",
                    other
                )))
            }
        };
        *slot = value;
        Ok(())
    }

    /// Set the reminder time, validating "HH:MM"
    pub fn set_reminder_time(&mut self, time: &str) -> Result<(), ApiError> {
        chrono::NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            ApiError::Validation(format!("Invalid reminder time '{}': use HH:MM", time))
        })?;
        self.study_reminder_time = time.to_string();
        Ok(())
    }
}

/// Reviews done on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyReviews {
    pub date: NaiveDate,
    pub count: u32,
}

/// How often a rating was given
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingCount {
    pub rating: u32,
    pub count: u32,
}

/// Card counts per status on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusTrendPoint {
    pub date: NaiveDate,
    pub learning: u32,
    pub reviewing: u32,
    pub mastered: u32,
}

/// Dashboard numbers from `GET /statistics`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub total_cards: u32,
    pub mastered_cards: u32,
    pub learning_cards: u32,
    pub reviewing_cards: u32,
    pub due_cards: u32,
    #[serde(default)]
    pub daily_reviews: Vec<DailyReviews>,
    #[serde(default)]
    pub review_ratings: Vec<RatingCount>,
    #[serde(default)]
    pub card_status_trend: Vec<StatusTrendPoint>,
}

impl Statistics {
    /// Share of mastered cards, in percent
    pub fn mastery_percent(&self) -> f64 {
        if self.total_cards == 0 {
            0.0
        } else {
            self.mastered_cards as f64 * 100.0 / self.total_cards as f64
        }
    }

    /// Total reviews over the reported days
    pub fn total_reviews(&self) -> u32 {
        self.daily_reviews.iter().map(|d| d.count).sum()
    }

    /// Rating counts restricted to the 1-4 scale, in rating order
    pub fn rating_distribution(&self) -> Vec<(Rating, u32)> {
        Rating::ALL
            .iter()
            .map(|&r| {
                let count = self
                    .review_ratings
                    .iter()
                    .filter(|rc| rc.rating == r.value() as u32)
                    .map(|rc| rc.count)
                    .sum();
                (r, count)
            })
            .collect()
    }

    /// Status trend oldest first (the server reports newest first)
    pub fn trend_chronological(&self) -> Vec<StatusTrendPoint> {
        let mut trend = self.card_status_trend.clone();
        trend.sort_by_key(|p| p.date);
        trend
    }
}

/// Server timestamps, with or without a UTC offset
///
/// Naive timestamps are interpreted as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", s)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => parse(&s)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", s))),
                None => Ok(None),
            }
        }
    }
}

/// Ids that some server versions send as numbers and others as strings
mod id_string {
    pub mod option {
        use serde::{Deserialize, Deserializer};

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<String>, D::Error> {
            Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
                Raw::Int(i) => i.to_string(),
                Raw::Str(s) => s,
            }))
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Duration;

    /// A card due `due_in` from now (negative = overdue)
    pub fn card(id: CardId, word: &str, due_in: Duration) -> Card {
        let now = Utc::now();
        Card {
            id,
            word: word.to_string(),
            definition: format!("definition of {}", word),
            example: None,
            notes: None,
            created_at: now - Duration::days(3),
            updated_at: None,
            next_review: now + due_in,
            review_count: 0,
            status: CardStatus::Learning,
        }
    }

    pub fn review(card_id: CardId, rating: Rating) -> Review {
        Review {
            id: Some(card_id * 100 + rating.value() as i64),
            card_id,
            review_date: Utc::now(),
            rating: rating.value(),
            next_interval: rating.value() as i64,
        }
    }
}
