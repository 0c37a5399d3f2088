//! Console output formatting for MedBot results

use super::markdown::MarkdownRenderer;
use super::palette::Palette;
use chrono::{Local, NaiveDate};
use colored::{Color, Colorize};
use medbot_application::FlashcardSource;
use medbot_domain::{
    Conversation, ConversationHistory, ExamAttempt, ExamScore, FlashcardDeck, GradeReport,
    MonthGrid, Role, ScoreBand, StudyCalendar, StudyMode, Tool,
};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_WIDTH: usize = 4;

/// Formats MedBot data for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// The tool catalogue with the command that opens each tool
    pub fn format_tools() -> String {
        let mut output = Self::header("MedBot AI");
        output.push('\n');
        for tool in Tool::ALL {
            output.push_str(&format!(
                "\n  {:<20} {}\n  {:<20} {}\n",
                tool.title().cyan().bold(),
                tool.description(),
                "",
                format!("medbot {}", tool.command()).dimmed()
            ));
        }
        output.push_str(&Self::footer());
        output
    }

    /// Numbered conversation list, most recent first
    pub fn format_history(history: &ConversationHistory, current_id: &str) -> String {
        if history.is_empty() {
            return "No saved conversations.".dimmed().to_string();
        }

        let mut output = Self::section_header("Chat History");
        for (i, conversation) in history.iter().enumerate() {
            let marker = if conversation.id() == current_id {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            let updated = conversation
                .updated_at()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M");
            output.push_str(&format!(
                "{} {:>3}. {}  {}\n",
                marker,
                i + 1,
                conversation.title().bold(),
                format!("({}, {} messages)", updated, conversation.messages().len()).dimmed()
            ));
        }
        output
    }

    /// Full transcript, assistant replies rendered as markdown
    pub fn format_conversation(conversation: &Conversation, palette: Palette) -> String {
        let markdown = MarkdownRenderer::new(palette);
        let mut output = format!("{}\n", conversation.title().color(palette.heading).bold());

        for message in conversation.messages() {
            output.push('\n');
            match message.role() {
                Role::User => {
                    output.push_str(&format!("{}\n", "You:".color(palette.user).bold()));
                    output.push_str(&Self::indent(message.content(), "  "));
                }
                Role::Assistant => {
                    output.push_str(&format!(
                        "{}\n",
                        "MedBot:".color(palette.assistant).bold()
                    ));
                    output.push_str(&Self::indent(&markdown.render(message.content()), "  "));
                }
            }
            output.push('\n');
        }
        output
    }

    /// The deck as shown by the viewer: the current card in card mode,
    /// every card in list mode.
    pub fn format_deck(deck: &FlashcardDeck, palette: Palette) -> String {
        match deck.mode() {
            StudyMode::Cards => Self::format_card(deck, palette),
            StudyMode::List => Self::format_card_list(deck, palette),
        }
    }

    fn format_card(deck: &FlashcardDeck, palette: Palette) -> String {
        let Some(card) = deck.current() else {
            return "No flashcards.".dimmed().to_string();
        };

        let (label, text, color) = if deck.is_flipped() {
            ("Answer", card.answer.as_str(), palette.assistant)
        } else {
            ("Question", card.question.as_str(), palette.heading)
        };

        let mut output = format!(
            "{}  {}\n\n",
            format!("Card {}", deck.counter()).dimmed(),
            label.color(color).bold()
        );
        output.push_str(&Self::indent(text, "  "));
        output.push('\n');
        output
    }

    fn format_card_list(deck: &FlashcardDeck, palette: Palette) -> String {
        if deck.is_empty() {
            return "No flashcards.".dimmed().to_string();
        }
        let mut output = String::new();
        for (i, card) in deck.cards().iter().enumerate() {
            output.push_str(&format!(
                "{} {}\n   {}\n\n",
                format!("{:>2}.", i + 1).color(palette.accent),
                card.question.bold(),
                card.answer
            ));
        }
        output.trim_end().to_string()
    }

    pub fn format_sources(sources: &[FlashcardSource]) -> String {
        if sources.is_empty() {
            return String::new();
        }
        let mut output = format!("{}\n", "Sources:".dimmed());
        for source in sources {
            output.push_str(&format!(
                "  - {} ({}) #{}\n",
                source.course, source.university, source.chunk_id
            ));
        }
        output
    }

    /// The current question of an attempt with its options lettered
    pub fn format_exam_question(attempt: &ExamAttempt, palette: Palette) -> String {
        let Some(question) = attempt.current_question() else {
            return "This exam has no questions.".dimmed().to_string();
        };
        let selected = attempt.answer(attempt.current());

        let mut output = format!(
            "{}\n{}\n\n",
            attempt.counter().dimmed(),
            question.question.color(palette.heading).bold()
        );
        for (i, option) in question.options.iter().enumerate() {
            let letter = option_letter(i);
            if selected == Some(i) {
                output.push_str(&format!(
                    "  {} {}\n",
                    format!("({letter})").color(palette.accent).bold(),
                    option.bold()
                ));
            } else {
                output.push_str(&format!("   {letter}) {option}\n"));
            }
        }
        output
    }

    /// Local score after an attempt, with per-question explanations
    pub fn format_score(attempt: &ExamAttempt, score: &ExamScore, palette: Palette) -> String {
        let mut output = Self::section_header("Exam Results");
        output.push_str(&format!(
            "{} {}\n",
            "Score:".bold(),
            score.to_string().color(band_color(score.band(), palette)).bold()
        ));

        for (i, question) in attempt.questions().iter().enumerate() {
            let Some(correct) = question.correct_answer else {
                continue;
            };
            let chosen = attempt.answer(i);
            let mark = if chosen == Some(correct) {
                "v".color(palette.success)
            } else {
                "x".color(palette.error)
            };
            output.push_str(&format!(
                "\n{} {}. {}\n",
                mark,
                i + 1,
                question.question.bold()
            ));
            output.push_str(&format!(
                "    Your answer: {}   Correct: {}\n",
                chosen.map(option_letter).unwrap_or('-'),
                option_letter(correct)
            ));
            if !question.explanation.is_empty() {
                output.push_str(&format!("    {}\n", question.explanation.dimmed()));
            }
        }
        output
    }

    /// Server grading report
    pub fn format_grade_report(report: &GradeReport, palette: Palette) -> String {
        let mut output = Self::section_header("Graded Exam");
        output.push_str(&format!(
            "{} {} ({} correct)\n",
            "Score:".bold(),
            format!("{:.0}%", report.score)
                .color(band_color(report.band(), palette))
                .bold(),
            report.correct
        ));

        for (i, result) in report.results.iter().enumerate() {
            let mark = if result.is_correct {
                "v".color(palette.success)
            } else {
                "x".color(palette.error)
            };
            output.push_str(&format!("\n{} {}. {}\n", mark, i + 1, result.question.bold()));
            if let Some(answer) = &result.user_answer {
                output.push_str(&format!("    Your answer: {answer}\n"));
            }
            if !result.is_correct
                && let Some(answer) = &result.correct_answer
            {
                output.push_str(&format!("    Correct answer: {answer}\n"));
            }
            if !result.explanation.is_empty() {
                output.push_str(&format!("    {}\n", result.explanation.dimmed()));
            }
        }
        output
    }

    /// A month grid; days with planned topics are marked with `*`
    pub fn format_month(calendar: &StudyCalendar, grid: &MonthGrid, palette: Palette) -> String {
        let width = CELL_WIDTH * 7;
        let mut output = format!(
            "{}\n",
            format!("{:^width$}", grid.title())
                .color(palette.heading)
                .bold()
        );
        let header: String = WEEKDAYS.iter().map(|d| format!("{d:>3} ")).collect();
        output.push_str(&format!("{}\n", header.trim_end().dimmed()));

        for week in grid.weeks() {
            let mut row = String::new();
            for cell in week {
                match cell {
                    Some(day) => {
                        let planned = grid
                            .date(day)
                            .is_some_and(|date| !calendar.tasks_on(date).is_empty());
                        if planned {
                            row.push_str(
                                &format!("{day:>3}*").color(palette.accent).bold().to_string(),
                            );
                        } else {
                            row.push_str(&format!("{day:>3} "));
                        }
                    }
                    None => row.push_str(&" ".repeat(CELL_WIDTH)),
                }
            }
            output.push_str(row.trim_end());
            output.push('\n');
        }
        output
    }

    /// Topics planned for one date
    pub fn format_day(calendar: &StudyCalendar, date: NaiveDate, palette: Palette) -> String {
        let mut output = format!(
            "{}\n",
            date.format("%A, %B %-d, %Y").to_string().color(palette.heading).bold()
        );
        let tasks = calendar.tasks_on(date);
        if tasks.is_empty() {
            output.push_str(&format!("  {}\n", "No study topics scheduled.".dimmed()));
        }
        for task in tasks {
            match &task.category {
                Some(category) => output.push_str(&format!(
                    "  • {} {}\n",
                    task.task,
                    format!("[{category}]").dimmed()
                )),
                None => output.push_str(&format!("  • {}\n", task.task)),
            }
        }
        output
    }

    /// Every planned day in date order
    pub fn format_plan(calendar: &StudyCalendar, palette: Palette) -> String {
        if calendar.is_empty() {
            return "The study plan is empty.".dimmed().to_string();
        }
        let mut output = Self::section_header(&format!(
            "Study Plan: {} topics over {} days",
            calendar.task_count(),
            calendar.day_count()
        ));
        for (date, tasks) in calendar.days() {
            output.push_str(&format!(
                "{}  {}\n",
                date.format("%a %Y-%m-%d").to_string().color(palette.accent),
                tasks
                    .iter()
                    .map(|t| t.task.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            ));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `0 -> 'A'`, `1 -> 'B'`, ...
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
        .unwrap_or('?')
}

fn band_color(band: ScoreBand, palette: Palette) -> Color {
    match band {
        ScoreBand::Good => palette.success,
        ScoreBand::Fair => palette.warning,
        ScoreBand::Poor => palette.error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbot_domain::{ChatMessage, ExamPaper, ExamQuestion, Flashcard, StudyTask};

    fn plain() -> Palette {
        colored::control::set_override(false);
        Palette::default()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn option_letters() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(option_letter(26), '?');
    }

    #[test]
    fn tools_lists_every_tool() {
        plain();
        let output = ConsoleFormatter::format_tools();
        for tool in Tool::ALL {
            assert!(output.contains(tool.title()));
            assert!(output.contains(&format!("medbot {}", tool.command())));
        }
    }

    #[test]
    fn history_marks_current_conversation() {
        plain();
        let mut history = ConversationHistory::new();
        let mut first = Conversation::with_id("first");
        first.record_exchange(ChatMessage::user("Cranial nerves"), ChatMessage::assistant("12"));
        let mut second = Conversation::with_id("second");
        second.record_exchange(ChatMessage::user("Heart sounds"), ChatMessage::assistant("S1"));
        history.upsert(first);
        history.upsert(second);

        let output = ConsoleFormatter::format_history(&history, "first");
        let lines: Vec<_> = output.lines().filter(|l| l.contains(". ")).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("1. Heart sounds"));
        assert!(lines[0].starts_with(' '));
        assert!(lines[1].starts_with('*'));
        assert!(lines[1].contains("2 messages"));
    }

    #[test]
    fn empty_history() {
        plain();
        let output = ConsoleFormatter::format_history(&ConversationHistory::new(), "");
        assert_eq!(output, "No saved conversations.");
    }

    #[test]
    fn card_shows_question_then_answer() {
        let palette = plain();
        let mut deck = FlashcardDeck::new(vec![
            Flashcard::new("What is the SA node?", "The heart's pacemaker"),
            Flashcard::new("Q2", "A2"),
        ]);

        let front = ConsoleFormatter::format_deck(&deck, palette);
        assert!(front.starts_with("Card 1 / 2  Question"));
        assert!(front.contains("  What is the SA node?"));

        deck.flip();
        let back = ConsoleFormatter::format_deck(&deck, palette);
        assert!(back.contains("Answer"));
        assert!(back.contains("The heart's pacemaker"));

        deck.toggle_mode();
        let list = ConsoleFormatter::format_deck(&deck, palette);
        assert!(list.contains(" 1. What is the SA node?"));
        assert!(list.contains(" 2. Q2\n   A2"));
    }

    #[test]
    fn exam_question_highlights_selection() {
        let palette = plain();
        let mut attempt = ExamAttempt::new(ExamPaper {
            questions: vec![ExamQuestion {
                question: "Largest organ?".into(),
                options: vec!["Liver".into(), "Skin".into()],
                correct_answer: Some(1),
                explanation: "Skin by surface and mass.".into(),
            }],
        });
        attempt.select(0, 1).unwrap();

        let output = ConsoleFormatter::format_exam_question(&attempt, palette);
        assert!(output.starts_with("Question 1 of 1\nLargest organ?"));
        assert!(output.contains("   A) Liver"));
        assert!(output.contains("  (B) Skin"));

        let score = attempt.score();
        let results = ConsoleFormatter::format_score(&attempt, &score, palette);
        assert!(results.contains("Score: 1/1 (100%)"));
        assert!(results.contains("Your answer: B   Correct: B"));
        assert!(results.contains("Skin by surface and mass."));
    }

    #[test]
    fn grade_report_shows_corrections() {
        let palette = plain();
        let report: GradeReport = serde_json::from_str(
            r#"{"score": 50, "correct": 1, "results": [
                {"isCorrect": true, "question": "Q1", "userAnswer": 0, "correctAnswer": 0, "explanation": ""},
                {"isCorrect": false, "question": "Q2", "userAnswer": "Liver", "correctAnswer": "Skin", "explanation": "Because."}
            ]}"#,
        )
        .unwrap();

        let output = ConsoleFormatter::format_grade_report(&report, palette);
        assert!(output.contains("Score: 50% (1 correct)"));
        assert!(output.contains("x 2. Q2"));
        assert!(output.contains("Correct answer: Skin"));
        assert_eq!(output.matches("Correct answer").count(), 1);
    }

    #[test]
    fn month_grid_marks_planned_days() {
        let palette = plain();
        let mut calendar = StudyCalendar::new();
        calendar.insert(date("2026-10-02"), StudyTask::new("Cardiology"));

        let grid = MonthGrid::containing(date("2026-10-15"));
        let output = ConsoleFormatter::format_month(&calendar, &grid, palette);
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0].trim(), "October 2026");
        assert_eq!(lines[1], "Sun Mon Tue Wed Thu Fri Sat");
        // October 1st 2026 is a Thursday
        assert_eq!(lines[2], format!("{}  1   2*  3", " ".repeat(16)));
        assert_eq!(lines.len(), 2 + grid.weeks().len());
    }

    #[test]
    fn day_lists_topics() {
        let palette = plain();
        let mut calendar = StudyCalendar::new();
        calendar.insert(
            date("2026-10-02"),
            StudyTask::new("Cardiology").with_category("Review"),
        );

        let output = ConsoleFormatter::format_day(&calendar, date("2026-10-02"), palette);
        assert!(output.starts_with("Friday, October 2, 2026"));
        assert!(output.contains("• Cardiology [Review]"));

        let empty = ConsoleFormatter::format_day(&calendar, date("2026-10-03"), palette);
        assert!(empty.contains("No study topics scheduled."));
    }

    #[test]
    fn conversation_transcript() {
        let palette = plain();
        let mut conversation = Conversation::new();
        conversation.record_exchange(
            ChatMessage::user("List two valves"),
            ChatMessage::assistant("- mitral\n- aortic"),
        );

        let output = ConsoleFormatter::format_conversation(&conversation, palette);
        assert!(output.contains("You:\n  List two valves"));
        assert!(output.contains("MedBot:\n  • mitral\n  • aortic"));
    }
}
