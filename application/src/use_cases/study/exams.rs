//! Practice exam generation and grading.

use super::{StudyError, with_progress};
use crate::config::Endpoint;
use crate::ports::medbot_gateway::{GatewayError, MedbotGateway, decode_response};
use crate::ports::progress::ProgressNotifier;
use crate::ports::stream_renderer::StreamRenderer;
use crate::use_cases::stream_assembler::StreamAssembler;
use medbot_domain::{DomainError, ExamAttempt, GradeReport};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const DEFAULT_EXAM_TYPE: &str = "final";
pub const DEFAULT_EXAM_DIFFICULTY: &str = "medium";

/// Body of an exam generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamRequest {
    pub course: String,
    pub exam_type: String,
    pub difficulty: String,
}

impl ExamRequest {
    pub fn new(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            exam_type: DEFAULT_EXAM_TYPE.to_string(),
            difficulty: DEFAULT_EXAM_DIFFICULTY.to_string(),
        }
    }

    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = exam_type.into().trim().to_lowercase();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into().trim().to_lowercase();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRating {
    Good,
    Bad,
}

impl fmt::Display for FeedbackRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackRating::Good => f.write_str("good"),
            FeedbackRating::Bad => f.write_str("bad"),
        }
    }
}

/// A rating of a generated exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamFeedback {
    pub rating: FeedbackRating,
    pub comments: String,
    pub student_id: String,
}

/// Use case for practice exams.
#[derive(Clone)]
pub struct ExamsUseCase {
    gateway: Arc<dyn MedbotGateway>,
    assembler: StreamAssembler,
}

impl ExamsUseCase {
    pub fn new(gateway: Arc<dyn MedbotGateway>) -> Self {
        Self {
            assembler: StreamAssembler::new(gateway.clone()),
            gateway,
        }
    }

    /// Stream a generated exam into `renderer`. Returns the exam text.
    pub async fn generate(
        &self,
        request: ExamRequest,
        renderer: &mut dyn StreamRenderer,
        cancel: &CancellationToken,
    ) -> Result<String, StudyError> {
        if request.course.trim().is_empty() {
            return Err(DomainError::EmptyCourse.into());
        }
        info!(
            "Generating {} {} exam for {:?}",
            request.difficulty, request.exam_type, request.course
        );

        let body =
            serde_json::to_value(&request).map_err(|e| GatewayError::Other(e.to_string()))?;
        let outcome = self
            .assembler
            .run(Endpoint::ExamGenerate, body, renderer, cancel)
            .await?;
        Ok(outcome.text)
    }

    /// Have the server grade an attempt.
    pub async fn grade(
        &self,
        attempt: &ExamAttempt,
        progress: &dyn ProgressNotifier,
    ) -> Result<GradeReport, StudyError> {
        info!(
            "Submitting exam for grading ({} of {} unanswered)",
            attempt.unanswered(),
            attempt.len()
        );
        let body = json!({
            "answers": attempt.answers(),
            "questions": attempt.questions(),
        });
        with_progress(progress, "Grading exam", async {
            let value = self.gateway.post_json(Endpoint::ExamGrade, body).await?;
            Ok(decode_response(value)?)
        })
        .await
    }

    pub async fn send_feedback(&self, feedback: ExamFeedback) -> Result<(), StudyError> {
        info!("Sending exam feedback: {}", feedback.rating);
        let body =
            serde_json::to_value(&feedback).map_err(|e| GatewayError::Other(e.to_string()))?;
        self.gateway.post_json(Endpoint::ExamFeedback, body).await?;
        Ok(())
    }
}
