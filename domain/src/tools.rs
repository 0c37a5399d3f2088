//! The study tools MedBot offers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Chat,
    Flashcards,
    Exams,
    Planner,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Chat, Tool::Flashcards, Tool::Exams, Tool::Planner];

    pub fn id(&self) -> &'static str {
        match self {
            Tool::Chat => "chat",
            Tool::Flashcards => "flashcards",
            Tool::Exams => "exams",
            Tool::Planner => "planner",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tool::Chat => "AI Chatbot",
            Tool::Flashcards => "AI Flashcards",
            Tool::Exams => "AI Practice Exams",
            Tool::Planner => "AI Study Planner",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::Chat => "Get instant answers to your medical questions",
            Tool::Flashcards => "Create and study custom flashcard sets",
            Tool::Exams => "Test your knowledge with practice questions",
            Tool::Planner => "Generate personalized study schedules",
        }
    }

    /// CLI subcommand that opens the tool.
    pub fn command(&self) -> &'static str {
        match self {
            Tool::Chat => "chat",
            Tool::Flashcards => "flashcards",
            Tool::Exams => "exam",
            Tool::Planner => "plan",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
