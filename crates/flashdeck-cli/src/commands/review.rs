//! Review command handler
//!
//! Walks through one card or the whole due list on the terminal: question,
//! reveal, rating. With `--rating` every card gets that rating without
//! prompting.

use anyhow::{bail, Result};

use flashdeck_core::{AppContext, Card, CardId, Rating, ReviewPhase, SubmitOutcome};

use super::require_session;
use crate::editor::{is_interactive, prompt};
use crate::output::{Output, NO_CARDS_DUE};

/// What the user typed at the rating prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Rate(Rating),
    Skip,
    Quit,
}

fn parse_choice(input: &str) -> Option<Choice> {
    let choice = match input.trim().to_lowercase().as_str() {
        "1" | "h" | "hard" => Choice::Rate(Rating::Hard),
        "2" | "g" | "good" => Choice::Rate(Rating::Good),
        "3" | "e" | "easy" => Choice::Rate(Rating::Easy),
        "4" | "p" | "perfect" => Choice::Rate(Rating::Perfect),
        "s" | "skip" => Choice::Skip,
        "q" | "quit" => Choice::Quit,
        _ => return None,
    };
    Some(choice)
}

pub async fn run(
    ctx: &AppContext,
    id: Option<CardId>,
    rating: Option<u8>,
    output: &Output,
) -> Result<()> {
    require_session(ctx)?;

    let fixed = rating.map(Rating::try_from).transpose()?;
    if fixed.is_none() && !is_interactive() {
        bail!("Reviewing needs a terminal. Pass --rating 1-4 to rate without prompting.");
    }

    let ids: Vec<CardId> = match id {
        Some(id) => vec![id],
        None => ctx
            .cards()
            .due_cards()
            .fetch()
            .await?
            .iter()
            .map(|c| c.id)
            .collect(),
    };
    if ids.is_empty() {
        output.message(NO_CARDS_DUE);
        return Ok(());
    }

    let total = ids.len();
    let mut reviewed = 0;

    'cards: for (n, id) in ids.into_iter().enumerate() {
        let session = ctx.review_session(id);
        if session.load().await == ReviewPhase::NotFound {
            if !ctx.is_authenticated() {
                bail!("Session expired. Log in again with `flashdeck login`.");
            }
            output.message(&format!("Card {} not found, skipping", id));
            continue;
        }
        let Some(card) = session.state().card else {
            continue;
        };

        if fixed.is_none() {
            print_question(&card, n + 1, total);
            let input = prompt("Press Enter to show the answer (q to quit)")?;
            if parse_choice(&input) == Some(Choice::Quit) {
                break;
            }
        }
        session.reveal().await;

        loop {
            let rating = match fixed {
                Some(r) => r,
                None => {
                    print_answer(&card);
                    let input = prompt("Rate 1 Hard, 2 Good, 3 Easy, 4 Perfect (s skip, q quit)")?;
                    match parse_choice(&input) {
                        Some(Choice::Rate(r)) => r,
                        Some(Choice::Skip) => continue 'cards,
                        Some(Choice::Quit) => break 'cards,
                        None => {
                            println!("Please answer 1-4, s or q.");
                            continue;
                        }
                    }
                }
            };

            match session.submit(rating).await {
                SubmitOutcome::Submitted(review) => {
                    reviewed += 1;
                    output.print_review(&review);
                    break;
                }
                SubmitOutcome::Failed(e) => {
                    if fixed.is_some() || e.is_auth() {
                        return Err(e.into());
                    }
                    eprintln!("Error: {}. Try again.", e.user_message());
                }
                SubmitOutcome::Ignored => break,
            }
        }
    }

    output.success(&format!("Reviewed {} of {} card(s)", reviewed, total));
    Ok(())
}

fn print_question(card: &Card, n: usize, total: usize) {
    println!();
    println!("── Card {} of {} ──", n, total);
    println!();
    println!("  {}", card.word);
    println!();
}

fn print_answer(card: &Card) {
    println!("  {}", card.definition);
    if let Some(example) = card.example_text() {
        println!("  e.g. {}", example);
    }
    if let Some(notes) = card.notes_text() {
        println!("  ({})", notes);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1"), Some(Choice::Rate(Rating::Hard)));
        assert_eq!(parse_choice(" 4 "), Some(Choice::Rate(Rating::Perfect)));
        assert_eq!(parse_choice("G"), Some(Choice::Rate(Rating::Good)));
        assert_eq!(parse_choice("easy"), Some(Choice::Rate(Rating::Easy)));
        assert_eq!(parse_choice("s"), Some(Choice::Skip));
        assert_eq!(parse_choice("q"), Some(Choice::Quit));
        assert_eq!(parse_choice("5"), None);
        assert_eq!(parse_choice(""), None);
    }
}
