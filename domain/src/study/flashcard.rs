//! Flashcards and deck navigation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single question/answer card.
///
/// Generated decks use either `question`/`answer` or `front`/`back`;
/// both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(alias = "front")]
    pub question: String,
    #[serde(alias = "back")]
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// How a deck is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    /// One card at a time, flippable.
    #[default]
    Cards,
    /// Every card with its answer.
    List,
}

impl StudyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyMode::Cards => "cards",
            StudyMode::List => "list",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            StudyMode::Cards => StudyMode::List,
            StudyMode::List => StudyMode::Cards,
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cards" | "card" => Ok(StudyMode::Cards),
            "list" => Ok(StudyMode::List),
            other => Err(format!("unknown study mode: {other} (expected cards or list)")),
        }
    }
}

/// A generated deck plus the reading position of whoever studies it.
///
/// Navigation is bounded at both ends and moving to another card always
/// shows its question side first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardDeck {
    cards: Vec<Flashcard>,
    index: usize,
    flipped: bool,
    mode: StudyMode,
    context: Option<String>,
}

impl FlashcardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            ..Self::default()
        }
    }

    /// Keep the source text the deck was generated from, so it can be
    /// regenerated later.
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.cards.len()
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    /// Advance one card. Returns `false` at the last card.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        self.flipped = false;
        true
    }

    /// Go back one card. Returns `false` at the first card.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.index -= 1;
        self.flipped = false;
        true
    }

    pub fn flip(&mut self) {
        if !self.cards.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    pub fn set_mode(&mut self, mode: StudyMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Swap in a regenerated set of cards, starting over from the first.
    pub fn replace_cards(&mut self, cards: Vec<Flashcard>) {
        self.cards = cards;
        self.index = 0;
        self.flipped = false;
    }

    /// Position shown to the user, e.g. `3 / 10`.
    pub fn counter(&self) -> String {
        if self.cards.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.cards.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(n: usize) -> FlashcardDeck {
        FlashcardDeck::new(
            (1..=n)
                .map(|i| Flashcard::new(format!("Q{i}"), format!("A{i}")))
                .collect(),
        )
    }

    #[test]
    fn accepts_front_back_spelling() {
        let card: Flashcard =
            serde_json::from_str(r#"{"front":"What is ADH?","back":"Vasopressin"}"#).unwrap();
        assert_eq!(card, Flashcard::new("What is ADH?", "Vasopressin"));
    }

    #[test]
    fn navigation_is_bounded() {
        let mut deck = deck(2);
        assert_eq!(deck.counter(), "1 / 2");
        assert!(!deck.prev());
        assert!(deck.next());
        assert_eq!(deck.counter(), "2 / 2");
        assert!(!deck.next());
        assert_eq!(deck.current().unwrap().question, "Q2");
    }

    #[test]
    fn moving_resets_flip() {
        let mut deck = deck(3);
        deck.flip();
        assert!(deck.is_flipped());
        deck.next();
        assert!(!deck.is_flipped());
        deck.flip();
        deck.prev();
        assert!(!deck.is_flipped());
    }

    #[test]
    fn empty_deck() {
        let mut deck = deck(0);
        assert_eq!(deck.counter(), "0 / 0");
        assert!(deck.current().is_none());
        deck.flip();
        assert!(!deck.is_flipped());
        assert!(!deck.next());
    }

    #[test]
    fn replace_cards_starts_over() {
        let mut deck = deck(3).with_context(Some("renal physiology".into()));
        deck.next();
        deck.next();
        deck.flip();
        deck.replace_cards(vec![Flashcard::new("new", "card")]);
        assert_eq!(deck.counter(), "1 / 1");
        assert!(!deck.is_flipped());
        assert_eq!(deck.context(), Some("renal physiology"));
    }

    #[test]
    fn blank_context_is_dropped() {
        let deck = deck(1).with_context(Some("  ".into()));
        assert!(deck.context().is_none());
    }

    #[test]
    fn mode_toggles() {
        let mut deck = deck(1);
        assert_eq!(deck.mode(), StudyMode::Cards);
        deck.toggle_mode();
        assert_eq!(deck.mode(), StudyMode::List);
        assert_eq!("LIST".parse::<StudyMode>().unwrap(), StudyMode::List);
        assert!("grid".parse::<StudyMode>().is_err());
    }
}
