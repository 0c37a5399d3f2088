//! Line-based practice exam runner

use crate::output::{ConsoleFormatter, Palette, option_letter};
use colored::Colorize;
use medbot_domain::ExamAttempt;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};

/// One line typed while taking an exam
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamInput {
    /// Choose an option (0-based)
    Select(usize),
    Next,
    Prev,
    Submit,
    Quit,
    Help,
    Invalid(String),
}

impl ExamInput {
    /// Options are picked by letter (`b`) or number (`2`). Command words
    /// always work; their one-letter forms only when they do not name an
    /// option of the current question.
    pub fn parse(line: &str, option_count: usize) -> Self {
        let input = line.trim().to_lowercase();
        match input.as_str() {
            "" | "next" => return ExamInput::Next,
            "prev" | "back" => return ExamInput::Prev,
            "submit" | "done" => return ExamInput::Submit,
            "quit" | "exit" => return ExamInput::Quit,
            "help" | "?" => return ExamInput::Help,
            _ => {}
        }

        let mut chars = input.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && c.is_ascii_lowercase()
        {
            let index = usize::from(c as u8 - b'a');
            if index < option_count {
                return ExamInput::Select(index);
            }
            match c {
                'n' => return ExamInput::Next,
                'p' => return ExamInput::Prev,
                's' => return ExamInput::Submit,
                'q' => return ExamInput::Quit,
                'h' => return ExamInput::Help,
                _ => {}
            }
        }

        match input.parse::<usize>() {
            Ok(n) if (1..=option_count).contains(&n) => ExamInput::Select(n - 1),
            _ => ExamInput::Invalid(line.trim().to_string()),
        }
    }
}

/// How an exam session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamExit {
    Submitted,
    Quit,
}

/// Walks the user through an [`ExamAttempt`] at a prompt
pub struct ExamRunner {
    palette: Palette,
}

impl ExamRunner {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn run(&self, attempt: &mut ExamAttempt) -> RlResult<ExamExit> {
        let mut rl = DefaultEditor::new()?;
        self.print_help();
        let mut show_question = true;

        loop {
            if show_question {
                println!();
                println!(
                    "{}",
                    ConsoleFormatter::format_exam_question(attempt, self.palette)
                );
            }
            show_question = true;

            let option_count = attempt
                .current_question()
                .map(|q| q.options.len())
                .unwrap_or(0);

            let line = match rl.readline("answer> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    return Ok(ExamExit::Quit);
                }
                Err(e) => return Err(e),
            };

            match ExamInput::parse(&line, option_count) {
                ExamInput::Select(option) => {
                    if let Err(e) = attempt.select(attempt.current(), option) {
                        println!("{}", e);
                        continue;
                    }
                    println!(
                        "Selected {}.",
                        option_letter(option).to_string().color(self.palette.accent)
                    );
                    attempt.next();
                }
                ExamInput::Next => {
                    if !attempt.next() {
                        println!("This is the last question. Type 'submit' when ready.");
                        show_question = false;
                    }
                }
                ExamInput::Prev => {
                    if !attempt.prev() {
                        println!("This is the first question.");
                        show_question = false;
                    }
                }
                ExamInput::Submit => {
                    if self.confirm_submit(attempt, &mut rl)? {
                        return Ok(ExamExit::Submitted);
                    }
                }
                ExamInput::Quit => return Ok(ExamExit::Quit),
                ExamInput::Help => {
                    self.print_help();
                    show_question = false;
                }
                ExamInput::Invalid(text) => {
                    println!("Unrecognized input: {} (type 'help')", text);
                    show_question = false;
                }
            }
        }
    }

    fn confirm_submit(&self, attempt: &ExamAttempt, rl: &mut DefaultEditor) -> RlResult<bool> {
        let unanswered = attempt.unanswered();
        if unanswered == 0 {
            return Ok(true);
        }
        let prompt = format!("{unanswered} question(s) unanswered. Submit anyway? [y/N] ");
        match rl.readline(&prompt) {
            Ok(answer) => Ok(answer.trim().eq_ignore_ascii_case("y")),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Answer with a letter (a, b, ...) or number.".bold());
        println!("  next/n, prev/p   - Move between questions (Enter = next)");
        println!("  submit/s         - Finish and score the exam");
        println!("  quit/q           - Leave without scoring");
    }
}
