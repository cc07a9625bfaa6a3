//! Card command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use flashdeck_core::{AppContext, Card, CardId, CardPatch, NewCard};

use super::require_session;
use crate::editor::{edit_text, is_interactive};
use crate::output::Output;

/// List all cards, or only the due ones
pub async fn list(ctx: &AppContext, due: bool, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let query = if due {
        ctx.cards().due_cards()
    } else {
        ctx.cards().all_cards()
    };
    let cards = query.fetch().await?;

    output.print_cards(&cards, due);
    Ok(())
}

pub async fn show(ctx: &AppContext, id: CardId, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let card = ctx.cards().get_by_id(id).await?;
    output.print_card(&card);
    Ok(())
}

pub async fn add(
    ctx: &AppContext,
    word: String,
    definition: String,
    example: Option<String>,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    require_session(ctx)?;

    let card = NewCard {
        example,
        notes,
        ..NewCard::new(word, definition)
    };
    card.validate()?;

    let created = ctx.cards().create_card(&card).await?;
    output.success(&format!("Created card: {}", created.id));
    output.print_card(&created);
    Ok(())
}

/// Field values given on the command line for `cards edit`
#[derive(Debug, Default)]
pub struct CardEdits {
    pub word: Option<String>,
    pub definition: Option<String>,
    pub example: Option<String>,
    pub notes: Option<String>,
}

impl CardEdits {
    fn is_empty(&self) -> bool {
        self.word.is_none()
            && self.definition.is_none()
            && self.example.is_none()
            && self.notes.is_none()
    }

    fn apply(self, card: &Card) -> NewCard {
        NewCard {
            word: self.word.unwrap_or_else(|| card.word.clone()),
            definition: self.definition.unwrap_or_else(|| card.definition.clone()),
            example: self.example.or_else(|| card.example.clone()),
            notes: self.notes.or_else(|| card.notes.clone()),
        }
    }
}

/// Edit a card from flags, or in $EDITOR when no flag is given
pub async fn edit(ctx: &AppContext, id: CardId, edits: CardEdits, output: &Output) -> Result<()> {
    require_session(ctx)?;

    let card = ctx.cards().get_by_id(id).await?;

    let edited = if edits.is_empty() {
        if !is_interactive() {
            bail!("Nothing to change. Pass --word, --definition, --example or --notes.");
        }
        let content = edit_text(&card_template(&card))?;
        parse_card_template(&content)?
    } else {
        edits.apply(&card)
    };
    edited.validate()?;

    let patch = CardPatch::diff(&card, &edited);
    if patch.is_empty() {
        output.message("No changes.");
        return Ok(());
    }

    let updated = ctx.cards().update_card(id, &patch).await?;
    output.success(&format!("Updated card: {}", updated.id));
    output.print_card(&updated);
    Ok(())
}

/// Upload a CSV/XLSX file of cards
pub async fn import(ctx: &AppContext, path: PathBuf, output: &Output) -> Result<()> {
    require_session(ctx)?;

    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    let cards = ctx
        .cards()
        .import_cards(&path)
        .await
        .with_context(|| format!("Failed to import {}", path.display()))?;

    output.success(&format!("Imported {} card(s)", cards.len()));
    if !output.is_quiet() {
        output.print_cards(&cards, false);
    }
    Ok(())
}

const TEMPLATE_HELP: &str = "# Edit the card below. Lines starting with '#' are ignored.\n\
                             # Leave example or notes empty to clear them.\n";

fn card_template(card: &Card) -> String {
    format!(
        "{}word: {}\ndefinition: {}\nexample: {}\nnotes: {}\n",
        TEMPLATE_HELP,
        card.word,
        card.definition,
        card.example.as_deref().unwrap_or(""),
        card.notes.as_deref().unwrap_or("")
    )
}

/// Read back an edited template; `word` and `definition` must be present
fn parse_card_template(content: &str) -> Result<NewCard> {
    let mut card = NewCard::default();
    let mut seen_word = false;
    let mut seen_definition = false;

    for line in content.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            bail!("Expected 'field: value', got: {}", line);
        };
        let value = value.trim().to_string();
        match key.trim() {
            "word" => {
                card.word = value;
                seen_word = true;
            }
            "definition" => {
                card.definition = value;
                seen_definition = true;
            }
            "example" => card.example = Some(value),
            "notes" => card.notes = Some(value),
            other => bail!("Unknown field: {}", other),
        }
    }

    if !seen_word || !seen_definition {
        bail!("The card needs both a word and a definition");
    }
    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flashdeck_core::CardStatus;

    fn card() -> Card {
        Card {
            id: 7,
            word: "hola".into(),
            definition: "hello".into(),
            example: Some("¡Hola, amigo!".into()),
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
            next_review: Utc::now(),
            review_count: 0,
            status: CardStatus::Learning,
        }
    }

    #[test]
    fn test_template_round_trips_unchanged_card() {
        let card = card();
        let parsed = parse_card_template(&card_template(&card)).unwrap();

        assert_eq!(parsed.word, "hola");
        assert_eq!(parsed.definition, "hello");
        assert!(CardPatch::diff(&card, &parsed).is_empty());
    }

    #[test]
    fn test_template_edit_produces_patch() {
        let card = card();
        let edited = card_template(&card)
            .replace("definition: hello", "definition: hi")
            .replace("notes: ", "notes: informal");
        let parsed = parse_card_template(&edited).unwrap();

        let patch = CardPatch::diff(&card, &parsed);
        assert_eq!(patch.definition.as_deref(), Some("hi"));
        assert_eq!(patch.notes.as_deref(), Some("informal"));
        assert!(patch.word.is_none());
    }

    #[test]
    fn test_template_requires_word_and_definition() {
        assert!(parse_card_template("word: hola\n").is_err());
        assert!(parse_card_template("word: hola\ndefinition: hello\ncolor: red\n").is_err());
    }

    #[test]
    fn test_flag_edits_keep_other_fields() {
        let card = card();
        let edits = CardEdits {
            word: Some("buenas".into()),
            ..CardEdits::default()
        };
        let edited = edits.apply(&card);

        assert_eq!(edited.word, "buenas");
        assert_eq!(edited.definition, "hello");
        assert_eq!(edited.example.as_deref(), Some("¡Hola, amigo!"));
    }
}
