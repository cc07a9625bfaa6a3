//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{DateTime, Utc};
use flashdeck_core::{Card, NotificationSettings, Review, Statistics, User};
use serde::Serialize;

/// Shown instead of an empty due list
pub const NO_CARDS_DUE: &str = "No cards due for review. Come back later!";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single card
    pub fn print_card(&self, card: &Card) {
        match self.format {
            OutputFormat::Human => {
                let now = Utc::now();
                println!("ID:          {}", card.id);
                println!("Word:        {}", card.word);
                println!("Definition:  {}", card.definition);
                if let Some(example) = card.example_text() {
                    println!("Example:     {}", example);
                }
                if let Some(notes) = card.notes_text() {
                    println!("Notes:       {}", notes);
                }
                println!("Status:      {}", card.status.as_str());
                println!(
                    "Reviews:     {} {}",
                    card.review_count,
                    progress_bar(card.progress(), 10)
                );
                println!("Next review: {}", due_label(card.next_review, now));
                println!("Created:     {}", card.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(card),
            OutputFormat::Quiet => println!("{}", card.id),
        }
    }

    /// Print a list of cards; `due` selects the empty-list wording
    pub fn print_cards(&self, cards: &[Card], due: bool) {
        match self.format {
            OutputFormat::Human => {
                if cards.is_empty() {
                    println!("{}", empty_cards_message(due));
                    return;
                }
                let now = Utc::now();
                for card in cards {
                    println!(
                        "{:>5} | {:<25} | {:<9} | {}",
                        card.id,
                        truncate(&card.word, 25),
                        card.status.as_str(),
                        due_label(card.next_review, now)
                    );
                }
                println!("\n{} card(s)", cards.len());
            }
            OutputFormat::Json => print_json(&cards),
            OutputFormat::Quiet => {
                for card in cards {
                    println!("{}", card.id);
                }
            }
        }
    }

    /// Print the server's answer to a submitted rating
    pub fn print_review(&self, review: &Review) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Rated {}. Next review in {}.",
                    review.rating,
                    interval_label(review.next_interval)
                );
            }
            OutputFormat::Json => print_json(review),
            OutputFormat::Quiet => {}
        }
    }

    pub fn print_statistics(&self, stats: &Statistics) {
        match self.format {
            OutputFormat::Human => {
                println!("Total cards:  {}", stats.total_cards);
                println!("Due now:      {}", stats.due_cards);
                println!("Learning:     {}", stats.learning_cards);
                println!("Reviewing:    {}", stats.reviewing_cards);
                println!(
                    "Mastered:     {} ({:.0}%)",
                    stats.mastered_cards,
                    stats.mastery_percent()
                );

                let distribution = stats.rating_distribution();
                let most = distribution.iter().map(|(_, c)| *c).max().unwrap_or(0);
                println!();
                println!("── Ratings ──");
                for (rating, count) in &distribution {
                    let fraction = if most == 0 {
                        0.0
                    } else {
                        *count as f64 / most as f64
                    };
                    println!(
                        "{:<8} {} {}",
                        rating.label(),
                        progress_bar(fraction, 20),
                        count
                    );
                }

                if !stats.daily_reviews.is_empty() {
                    println!();
                    println!("── Reviews per day ({} total) ──", stats.total_reviews());
                    for day in &stats.daily_reviews {
                        println!("{}  {}", day.date.format("%Y-%m-%d"), day.count);
                    }
                }
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => println!("{}", stats.due_cards),
        }
    }

    pub fn print_user(&self, user: &User) {
        match self.format {
            OutputFormat::Human => {
                println!("Email:    {}", user.email);
                println!("Nickname: {}", user.nickname.as_deref().unwrap_or("-"));
                println!("Gender:   {}", user.gender.as_deref().unwrap_or("-"));
                println!(
                    "Plan:     {}",
                    if user.is_premium.unwrap_or(false) {
                        "premium"
                    } else {
                        "free"
                    }
                );
                if let Some(usage) = user.usage_count {
                    println!("Usage:    {}", usage);
                }
                if let Some(created) = user.created_at {
                    println!("Joined:   {}", created.format("%Y-%m-%d"));
                }
            }
            OutputFormat::Json => print_json(user),
            OutputFormat::Quiet => println!("{}", user.email),
        }
    }

    pub fn print_notification_settings(&self, settings: &NotificationSettings) {
        match self.format {
            OutputFormat::Human => {
                let types = &settings.notification_types;
                println!("email_notifications   {}", on_off(settings.email_notifications));
                println!("push_notifications    {}", on_off(settings.push_notifications));
                println!("new_cards             {}", on_off(types.new_cards));
                println!("study_reminders       {}", on_off(types.study_reminders));
                println!("achievement_unlocked  {}", on_off(types.achievement_unlocked));
                println!("system_updates        {}", on_off(types.system_updates));
                println!("study_reminder_time   {}", settings.study_reminder_time);
            }
            OutputFormat::Json => print_json(settings),
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

pub fn empty_cards_message(due: bool) -> &'static str {
    if due {
        NO_CARDS_DUE
    } else {
        "No cards yet. Add one with `flashdeck cards add`."
    }
}

/// When a card is next due, relative to `now`
pub fn due_label(next_review: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if next_review <= now {
        return "due now".to_string();
    }
    let remaining = next_review - now;
    if remaining.num_days() >= 1 {
        format!("in {}d ({})", remaining.num_days(), next_review.format("%Y-%m-%d"))
    } else if remaining.num_hours() >= 1 {
        format!("in {}h", remaining.num_hours())
    } else {
        format!("in {}m", remaining.num_minutes().max(1))
    }
}

/// Human wording for a review interval in days
pub fn interval_label(days: i64) -> String {
    match days {
        d if d <= 0 => "less than a day".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    }
}

/// Text progress bar for `fraction` in 0.0..=1.0
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
