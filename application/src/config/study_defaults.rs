//! Defaults for study tool requests.

use serde::{Deserialize, Serialize};

/// Difficulty levels the flashcard generator understands.
pub const DIFFICULTIES: [&str; 3] = ["beginner", "intermediate", "advanced"];

/// Values used when a flashcard or exam request leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyDefaults {
    pub university: String,
    pub course: String,
    pub difficulty: String,
    pub num_cards: u32,
}

impl Default for StudyDefaults {
    fn default() -> Self {
        Self {
            university: "McMaster University".to_string(),
            course: "Medicine".to_string(),
            difficulty: "intermediate".to_string(),
            num_cards: 10,
        }
    }
}
