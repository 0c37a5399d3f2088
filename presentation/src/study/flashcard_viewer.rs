//! Full-screen flashcard viewer.
//!
//! The deck is the only state; each key press maps to a [`DeckCommand`]
//! that mutates it, and the screen is redrawn from the deck afterwards.

use crate::output::{ConsoleFormatter, Palette};
use colored::Colorize;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use medbot_domain::FlashcardDeck;
use std::io::{self, Write};
use tracing::debug;

const KEY_HELP: &str = "←/→ move  space flip  l list/cards  r regenerate  q quit";

/// What a key press asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCommand {
    Next,
    Prev,
    Flip,
    ToggleMode,
    Regenerate,
    Quit,
}

impl DeckCommand {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Right | KeyCode::Char('n') => Some(DeckCommand::Next),
            KeyCode::Left | KeyCode::Char('p') => Some(DeckCommand::Prev),
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Up | KeyCode::Down => {
                Some(DeckCommand::Flip)
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(DeckCommand::Quit)
            }
            KeyCode::Char('l') => Some(DeckCommand::ToggleMode),
            KeyCode::Char('r') => Some(DeckCommand::Regenerate),
            KeyCode::Char('q') | KeyCode::Esc => Some(DeckCommand::Quit),
            _ => None,
        }
    }

    /// Apply to `deck`. Returns the action that ends the viewer, if any.
    pub fn apply(self, deck: &mut FlashcardDeck) -> Option<ViewerAction> {
        match self {
            DeckCommand::Next => {
                deck.next();
            }
            DeckCommand::Prev => {
                deck.prev();
            }
            DeckCommand::Flip => deck.flip(),
            DeckCommand::ToggleMode => deck.toggle_mode(),
            DeckCommand::Regenerate => return Some(ViewerAction::Regenerate),
            DeckCommand::Quit => return Some(ViewerAction::Quit),
        }
        None
    }
}

/// Why the viewer returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Quit,
    /// The user asked for a fresh set of cards
    Regenerate,
}

/// Restores the terminal even if drawing fails part way.
struct RawScreen;

impl RawScreen {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for RawScreen {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Interactive deck viewer on the alternate screen
pub struct FlashcardViewer {
    palette: Palette,
}

impl FlashcardViewer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Show `deck` until the user quits or asks to regenerate.
    pub fn run(&self, deck: &mut FlashcardDeck) -> io::Result<ViewerAction> {
        let _screen = RawScreen::enter()?;
        let mut stdout = io::stdout();

        loop {
            self.draw(&mut stdout, deck)?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(command) = DeckCommand::from_key(key) else {
                continue;
            };
            debug!(?command, "Flashcard viewer command");
            if let Some(action) = command.apply(deck) {
                return Ok(action);
            }
        }
    }

    /// The screen contents for `deck`, lines separated by `\n`.
    pub fn screen(&self, deck: &FlashcardDeck) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            format!("Flashcards ({} mode)", deck.mode())
                .color(self.palette.heading)
                .bold(),
            ConsoleFormatter::format_deck(deck, self.palette),
            KEY_HELP.dimmed()
        )
    }

    fn draw(&self, out: &mut impl Write, deck: &FlashcardDeck) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        // Raw mode does not translate \n into a carriage return
        write!(out, "{}", self.screen(deck).replace('\n', "\r\n"))?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbot_domain::{Flashcard, StudyMode};

    fn deck() -> FlashcardDeck {
        FlashcardDeck::new(vec![
            Flashcard::new("Q1", "A1"),
            Flashcard::new("Q2", "A2"),
            Flashcard::new("Q3", "A3"),
        ])
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(
            DeckCommand::from_key(press(KeyCode::Right)),
            Some(DeckCommand::Next)
        );
        assert_eq!(
            DeckCommand::from_key(press(KeyCode::Left)),
            Some(DeckCommand::Prev)
        );
        assert_eq!(
            DeckCommand::from_key(press(KeyCode::Char(' '))),
            Some(DeckCommand::Flip)
        );
        assert_eq!(
            DeckCommand::from_key(press(KeyCode::Char('l'))),
            Some(DeckCommand::ToggleMode)
        );
        assert_eq!(
            DeckCommand::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(DeckCommand::Quit)
        );
        assert_eq!(DeckCommand::from_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn commands_drive_the_deck() {
        let mut deck = deck();

        assert_eq!(DeckCommand::Flip.apply(&mut deck), None);
        assert!(deck.is_flipped());

        // Moving resets the flip
        DeckCommand::Next.apply(&mut deck);
        assert_eq!(deck.counter(), "2 / 3");
        assert!(!deck.is_flipped());

        DeckCommand::Next.apply(&mut deck);
        DeckCommand::Next.apply(&mut deck);
        assert_eq!(deck.counter(), "3 / 3");

        DeckCommand::ToggleMode.apply(&mut deck);
        assert_eq!(deck.mode(), StudyMode::List);

        assert_eq!(
            DeckCommand::Regenerate.apply(&mut deck),
            Some(ViewerAction::Regenerate)
        );
        assert_eq!(DeckCommand::Quit.apply(&mut deck), Some(ViewerAction::Quit));
    }

    #[test]
    fn screen_shows_mode_card_and_help() {
        colored::control::set_override(false);
        let viewer = FlashcardViewer::new(Palette::default());
        let screen = viewer.screen(&deck());
        assert!(screen.starts_with("Flashcards (cards mode)"));
        assert!(screen.contains("Card 1 / 3  Question"));
        assert!(screen.ends_with(KEY_HELP));
    }
}
