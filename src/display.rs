// File: src/display.rs
//! Plain-text rendering of cards for the terminal.

use crate::core::types::{Card, NotInVocabulary};

pub const NO_CARD_MESSAGE: &str = "Sorry, no card can be generated for this word! Please try another one.";

/// Draws the card in a box: the main word in its own section above the
/// taboo words. Every line has the same width.
pub fn render_card(card: &Card) -> String {
    let longest = std::iter::once(&card.main_word)
        .chain(&card.taboo_words)
        .map(|w| w.chars().count())
        .max()
        .unwrap_or(0);
    let width = longest + 8;
    let hline = format!(" -----{}-----", "-".repeat(longest));
    let row = |word: &str| format!(" |    {}{}|", word, " ".repeat(width - word.chars().count() - 4));

    let mut lines = vec![hline.clone(), row(&card.main_word), hline.clone()];
    lines.extend(card.taboo_words.iter().map(|w| row(w)));
    lines.push(hline);
    lines.join("\n")
}

pub fn render_outcome(outcome: &Result<Card, NotInVocabulary>) -> String {
    match outcome {
        Ok(card) => render_card(card),
        Err(_) => NO_CARD_MESSAGE.to_string(),
    }
}
