//! Study tools: flashcards, practice exams and study plans.

pub mod calendar;
pub mod exam;
pub mod flashcard;

pub use calendar::{DatedTask, MonthGrid, StudyCalendar, StudyTask, parse_date};
pub use exam::{
    AnswerValue, ExamAttempt, ExamPaper, ExamQuestion, ExamScore, GradeReport, GradedAnswer,
    ScoreBand,
};
pub use flashcard::{Flashcard, FlashcardDeck, StudyMode};
