//! Server endpoint paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every server call the client makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Chat,
    Speak,
    ExamGenerate,
    ExamGrade,
    ExamFeedback,
    FlashcardsGenerate,
    FlashcardsRegenerate,
    ProcessSyllabus,
    GeneratePlan,
    CheckAuth,
    CalendarUrl,
    AddToCalendar,
    DownloadPdf,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Chat => "chat",
            Endpoint::Speak => "speak",
            Endpoint::ExamGenerate => "exam_generate",
            Endpoint::ExamGrade => "exam_grade",
            Endpoint::ExamFeedback => "exam_feedback",
            Endpoint::FlashcardsGenerate => "flashcards_generate",
            Endpoint::FlashcardsRegenerate => "flashcards_regenerate",
            Endpoint::ProcessSyllabus => "process_syllabus",
            Endpoint::GeneratePlan => "generate_plan",
            Endpoint::CheckAuth => "check_auth",
            Endpoint::CalendarUrl => "calendar_url",
            Endpoint::AddToCalendar => "add_to_calendar",
            Endpoint::DownloadPdf => "download_pdf",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path for each [`Endpoint`], relative to the server base URL.
///
/// The backend has shipped under more than one set of route names, so
/// each path can be overridden from the `[server.endpoints]` config table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub chat: String,
    pub speak: String,
    pub exam_generate: String,
    pub exam_grade: String,
    pub exam_feedback: String,
    pub flashcards_generate: String,
    pub flashcards_regenerate: String,
    pub process_syllabus: String,
    pub generate_plan: String,
    pub check_auth: String,
    pub calendar_url: String,
    pub add_to_calendar: String,
    pub download_pdf: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            chat: "/chat/chat".to_string(),
            speak: "/chat/speak".to_string(),
            exam_generate: "/exam/generate-exam".to_string(),
            exam_grade: "/exam/grade".to_string(),
            exam_feedback: "/exam/feedback".to_string(),
            flashcards_generate: "/flashcard/generate-flashcards".to_string(),
            flashcards_regenerate: "/flashcard/regenerate-flashcards".to_string(),
            process_syllabus: "/calendar/process-syllabus".to_string(),
            generate_plan: "/calendar/generate-plan".to_string(),
            check_auth: "/calendar/check-auth".to_string(),
            calendar_url: "/calendar/get-calendar-url".to_string(),
            add_to_calendar: "/calendar/add-to-calendar".to_string(),
            download_pdf: "/calendar/download-pdf".to_string(),
        }
    }
}

impl EndpointPaths {
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Chat => &self.chat,
            Endpoint::Speak => &self.speak,
            Endpoint::ExamGenerate => &self.exam_generate,
            Endpoint::ExamGrade => &self.exam_grade,
            Endpoint::ExamFeedback => &self.exam_feedback,
            Endpoint::FlashcardsGenerate => &self.flashcards_generate,
            Endpoint::FlashcardsRegenerate => &self.flashcards_regenerate,
            Endpoint::ProcessSyllabus => &self.process_syllabus,
            Endpoint::GeneratePlan => &self.generate_plan,
            Endpoint::CheckAuth => &self.check_auth,
            Endpoint::CalendarUrl => &self.calendar_url,
            Endpoint::AddToCalendar => &self.add_to_calendar,
            Endpoint::DownloadPdf => &self.download_pdf,
        }
    }

    /// `(name, path)` for every endpoint, in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        ALL_ENDPOINTS
            .iter()
            .map(|e| (e.as_str(), self.path(*e)))
            .collect()
    }
}

pub const ALL_ENDPOINTS: [Endpoint; 13] = [
    Endpoint::Chat,
    Endpoint::Speak,
    Endpoint::ExamGenerate,
    Endpoint::ExamGrade,
    Endpoint::ExamFeedback,
    Endpoint::FlashcardsGenerate,
    Endpoint::FlashcardsRegenerate,
    Endpoint::ProcessSyllabus,
    Endpoint::GeneratePlan,
    Endpoint::CheckAuth,
    Endpoint::CalendarUrl,
    Endpoint::AddToCalendar,
    Endpoint::DownloadPdf,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_routes() {
        let paths = EndpointPaths::default();
        assert_eq!(paths.path(Endpoint::Chat), "/chat/chat");
        assert_eq!(paths.path(Endpoint::ExamGenerate), "/exam/generate-exam");
        assert_eq!(paths.entries().len(), ALL_ENDPOINTS.len());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let paths: EndpointPaths =
            serde_json::from_str(r#"{"exam_generate":"/exam/generate"}"#).unwrap();
        assert_eq!(paths.path(Endpoint::ExamGenerate), "/exam/generate");
        assert_eq!(paths.path(Endpoint::ExamGrade), "/exam/grade");
    }
}
