//! Practice exams: questions, attempts and scoring.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A multiple-choice question. `correct_answer` indexes into `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<usize>,
    #[serde(default)]
    pub explanation: String,
}

/// A set of questions, as served by the exam endpoints or saved to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPaper {
    pub questions: Vec<ExamQuestion>,
}

impl ExamPaper {
    /// Parse either `{"questions": [...]}` or a bare question list.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Paper(ExamPaper),
            List(Vec<ExamQuestion>),
        }

        Ok(match serde_json::from_str(json)? {
            Wire::Paper(paper) => paper,
            Wire::List(questions) => ExamPaper { questions },
        })
    }
}

/// Result of scoring an attempt locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamScore {
    pub correct: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percentage: u32,
}

impl ExamScore {
    pub fn new(correct: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            correct,
            total,
            percentage,
        }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.percentage as f64)
    }
}

impl fmt::Display for ExamScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.correct, self.total, self.percentage)
    }
}

/// Coarse rating of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            ScoreBand::Good
        } else if percentage >= 60.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

/// Someone working through an exam paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamAttempt {
    questions: Vec<ExamQuestion>,
    answers: Vec<Option<usize>>,
    current: usize,
}

impl ExamAttempt {
    pub fn new(paper: ExamPaper) -> Self {
        let answers = vec![None; paper.questions.len()];
        Self {
            questions: paper.questions,
            answers,
            current: 0,
        }
    }

    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&ExamQuestion> {
        self.questions.get(self.current)
    }

    pub fn answer(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Record an answer; selecting again replaces the previous choice.
    pub fn select(&mut self, index: usize, option: usize) -> Result<(), DomainError> {
        let question = self
            .questions
            .get(index)
            .ok_or(DomainError::QuestionOutOfRange {
                index,
                total: self.questions.len(),
            })?;
        if option >= question.options.len() {
            return Err(DomainError::OptionOutOfRange { index, option });
        }
        self.answers[index] = Some(option);
        Ok(())
    }

    pub fn unanswered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_none()).count()
    }

    pub fn score(&self) -> ExamScore {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.is_some() && **a == q.correct_answer)
            .count();
        ExamScore::new(correct, self.questions.len())
    }

    /// `Question 2 of 10`
    pub fn counter(&self) -> String {
        format!("Question {} of {}", self.current + 1, self.questions.len())
    }
}

/// An answer as echoed back by the grader: an option index or its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Index(u64),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Index(i) => write!(f, "{i}"),
            AnswerValue::Text(t) => f.write_str(t),
        }
    }
}

/// Per-question verdict from server-side grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub user_answer: Option<AnswerValue>,
    #[serde(default)]
    pub correct_answer: Option<AnswerValue>,
    #[serde(default)]
    pub explanation: String,
}

/// Server-side grading result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Percentage score.
    pub score: f64,
    pub correct: usize,
    #[serde(default)]
    pub results: Vec<GradedAnswer>,
}

impl GradeReport {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.score)
    }
}
