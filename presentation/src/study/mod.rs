//! Interactive study views

mod exam_runner;
mod flashcard_viewer;

pub use exam_runner::{ExamExit, ExamInput, ExamRunner};
pub use flashcard_viewer::{DeckCommand, FlashcardViewer, ViewerAction};
