//! Study tool use cases: flashcards, practice exams and study plans.

pub mod exams;
pub mod flashcards;
pub mod study_plan;

use crate::ports::medbot_gateway::GatewayError;
use crate::use_cases::stream_assembler::StreamError;
use medbot_domain::DomainError;
use thiserror::Error;

pub use exams::{ExamFeedback, ExamRequest, ExamsUseCase, FeedbackRating};
pub use flashcards::{FlashcardRequest, FlashcardSource, FlashcardsUseCase, GeneratedDeck};
pub use study_plan::{ExportOutcome, PlanRequest, StudyPlanUseCase};

/// Errors that can occur in the study tools.
#[derive(Error, Debug)]
pub enum StudyError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The server doubts the upload is a syllabus.
    #[error("{0}")]
    NotASyllabus(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("No flashcards were generated")]
    NoFlashcards,

    #[error("This deck has no source context to regenerate from")]
    NoContext,
}

impl StudyError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StudyError::Stream(e) if e.is_cancelled())
    }
}

/// Run `request` bracketed by progress notifications.
pub(crate) async fn with_progress<T, F>(
    progress: &dyn crate::ports::progress::ProgressNotifier,
    label: &str,
    request: F,
) -> Result<T, StudyError>
where
    F: std::future::Future<Output = Result<T, StudyError>>,
{
    progress.on_request_start(label);
    let result = request.await;
    progress.on_request_end(label, result.is_ok());
    result
}
