//! Command handlers
//!
//! Each subcommand builds the use case it needs from the shared
//! gateway and storage, runs it, and prints the result.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use medbot_application::{
    ChatUseCase, ConversationStore, ExamFeedback, ExamRequest, ExamsUseCase, ExportOutcome,
    FeedbackRating, FlashcardRequest, FlashcardsUseCase, KeyValueStore, MedbotGateway,
    NoProgress, PlanRequest, ProgressNotifier, StudyDefaults, StudyError, StudyPlanUseCase,
    ThemePreference,
};
use medbot_domain::{ExamAttempt, ExamPaper, MonthGrid, StudyCalendar, StudyMode};
use medbot_presentation::{
    ChatRepl, Command, ConsoleFormatter, ExamCommand, ExamExit, ExamRunner, FlashcardViewer,
    FlashcardsArgs, HistoryCommand, OutputConfig, Palette, PlanCommand, ProgressReporter, Rating,
    RenderMode, ReplConfig, SimpleProgress, TerminalRenderer, ThemeAction, ViewerAction,
    cancel_on_ctrl_c,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything the handlers share.
pub struct App {
    gateway: Arc<dyn MedbotGateway>,
    storage: Arc<dyn KeyValueStore>,
    output: OutputConfig,
    repl: ReplConfig,
    study: StudyDefaults,
    progress: Box<dyn ProgressNotifier>,
    palette: Palette,
}

impl App {
    pub fn new(
        gateway: Arc<dyn MedbotGateway>,
        storage: Arc<dyn KeyValueStore>,
        output: OutputConfig,
        repl: ReplConfig,
        study: StudyDefaults,
        quiet: bool,
    ) -> Self {
        let theme = output
            .theme
            .unwrap_or_else(|| ThemePreference::new(storage.clone()).load());
        let progress: Box<dyn ProgressNotifier> = if quiet {
            Box::new(NoProgress)
        } else if io::stderr().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        Self {
            gateway,
            storage,
            output,
            repl,
            study,
            progress,
            palette: Palette::for_theme(theme),
        }
    }

    pub async fn dispatch(&self, command: Option<Command>) -> Result<()> {
        match command {
            None => self.chat(None).await,
            Some(Command::Chat { message }) => self.chat(message).await,
            Some(Command::History(cmd)) => self.history(cmd),
            Some(Command::Flashcards(args)) => self.flashcards(args).await,
            Some(Command::Exam(cmd)) => self.exam(cmd).await,
            Some(Command::Plan(cmd)) => self.plan(cmd).await,
            Some(Command::Theme { action }) => self.theme(action),
            Some(Command::Speak { text }) => self.speak(&text).await,
            Some(Command::Tools) => {
                println!("{}", ConsoleFormatter::format_tools());
                Ok(())
            }
        }
    }

    // ==================== Chat ====================

    async fn chat(&self, message: Option<String>) -> Result<()> {
        let conversations = ConversationStore::load(self.storage.clone())?;
        let mut repl = ChatRepl::new(
            ChatUseCase::new(self.gateway.clone()),
            conversations,
            ThemePreference::new(self.storage.clone()),
            &self.output,
            self.repl.clone(),
        );

        match message {
            Some(message) => {
                if !repl.ask(&message).await {
                    bail!("No reply received");
                }
            }
            None => repl.run().await?,
        }
        Ok(())
    }

    fn history(&self, command: HistoryCommand) -> Result<()> {
        let mut store = ConversationStore::load(self.storage.clone())?;
        match command {
            HistoryCommand::List => {
                let current = store.current().id().to_string();
                println!(
                    "{}",
                    ConsoleFormatter::format_history(store.history(), &current)
                );
            }
            HistoryCommand::Show { number } => {
                let conversation = store.open_nth(position(number)?)?;
                println!(
                    "{}",
                    ConsoleFormatter::format_conversation(conversation, self.palette)
                );
            }
            HistoryCommand::Delete { number } => {
                let id = store
                    .history()
                    .nth(position(number)?)
                    .map(|c| c.id().to_string())
                    .with_context(|| format!("No saved chat #{number}"))?;
                store.delete(&id)?;
                println!("Deleted chat #{number}");
            }
            HistoryCommand::Clear { yes } => {
                if store.history().is_empty() {
                    println!("No saved chats.");
                    return Ok(());
                }
                if !yes && !confirm("Delete all saved chats?")? {
                    println!("Cancelled.");
                    return Ok(());
                }
                store.clear()?;
                println!("All saved chats deleted.");
            }
        }
        Ok(())
    }

    async fn speak(&self, text: &str) -> Result<()> {
        let chat = ChatUseCase::new(self.gateway.clone());
        let url = chat.speak(text).await?;
        println!("{url}");
        Ok(())
    }

    fn theme(&self, action: Option<ThemeAction>) -> Result<()> {
        let preference = ThemePreference::new(self.storage.clone());
        let saved = preference.load();
        match action {
            None => {
                println!("Theme: {saved}");
                if let Some(forced) = self.output.theme {
                    println!("(overridden by config: {forced})");
                }
            }
            Some(action) => {
                let theme = action.apply(saved);
                preference.save(theme)?;
                println!("Theme set to {theme}");
            }
        }
        Ok(())
    }

    // ==================== Flashcards ====================

    async fn flashcards(&self, args: FlashcardsArgs) -> Result<()> {
        let mut request = FlashcardRequest::new(args.topic, &self.study);
        if let Some(count) = args.count {
            request.num_cards = count;
        }
        if let Some(university) = args.university {
            request.university = university;
        }
        if let Some(course) = args.course {
            request.course = course;
        }
        if let Some(difficulty) = args.difficulty {
            request.difficulty = difficulty;
        }

        let use_case = FlashcardsUseCase::new(self.gateway.clone());
        let generated = use_case.generate(request, self.progress.as_ref()).await?;
        if let Some(message) = &generated.message {
            println!("{message}");
        }

        let mut deck = generated.deck;
        if args.mode == StudyMode::List {
            deck.toggle_mode();
        }

        if args.print || !io::stdout().is_terminal() {
            println!("{}", ConsoleFormatter::format_deck(&deck, self.palette));
        } else {
            let viewer = FlashcardViewer::new(self.palette);
            while viewer.run(&mut deck)? == ViewerAction::Regenerate {
                if let Err(e) = use_case.regenerate(&mut deck, self.progress.as_ref()).await {
                    eprintln!("{} {}", "Could not regenerate:".color(self.palette.error), e);
                    if matches!(e, StudyError::NoContext) {
                        break;
                    }
                }
            }
        }

        if !generated.sources.is_empty() {
            println!("{}", ConsoleFormatter::format_sources(&generated.sources));
        }
        Ok(())
    }

    // ==================== Exams ====================

    async fn exam(&self, command: ExamCommand) -> Result<()> {
        let exams = ExamsUseCase::new(self.gateway.clone());
        match command {
            ExamCommand::Generate {
                course,
                exam_type,
                difficulty,
            } => {
                let request = ExamRequest::new(course)
                    .with_exam_type(exam_type)
                    .with_difficulty(difficulty);
                let mut renderer = TerminalRenderer::new(self.palette, RenderMode::detect());
                if self.repl.show_progress {
                    renderer = renderer.with_spinner("Writing your exam...");
                }

                let cancel = CancellationToken::new();
                let watcher = cancel_on_ctrl_c(cancel.clone());
                let result = exams.generate(request, &mut renderer, &cancel).await;
                watcher.abort();
                println!();

                match result {
                    Ok(_) => Ok(()),
                    // The renderer has already reported it
                    Err(StudyError::Stream(e)) => {
                        debug!("Exam stream ended: {}", e);
                        if e.is_cancelled() {
                            Ok(())
                        } else {
                            bail!("Exam generation failed")
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
            ExamCommand::Take { file, grade } => {
                let paper = load_exam(&file)?;
                let mut attempt = ExamAttempt::new(paper);
                let runner = ExamRunner::new(self.palette);
                if runner.run(&mut attempt)? == ExamExit::Quit {
                    println!("Exam abandoned.");
                    return Ok(());
                }

                let score = attempt.score();
                println!(
                    "{}",
                    ConsoleFormatter::format_score(&attempt, &score, self.palette)
                );
                if grade {
                    let report = exams.grade(&attempt, self.progress.as_ref()).await?;
                    println!(
                        "{}",
                        ConsoleFormatter::format_grade_report(&report, self.palette)
                    );
                }
                Ok(())
            }
            ExamCommand::Feedback {
                rating,
                comments,
                student_id,
            } => {
                let rating = match rating {
                    Rating::Good => FeedbackRating::Good,
                    Rating::Bad => FeedbackRating::Bad,
                };
                exams
                    .send_feedback(ExamFeedback {
                        rating,
                        comments: comments.unwrap_or_default(),
                        student_id: student_id.unwrap_or_default(),
                    })
                    .await?;
                println!("Thanks for your feedback!");
                Ok(())
            }
        }
    }

    // ==================== Study plans ====================

    async fn plan(&self, command: PlanCommand) -> Result<()> {
        let plans = StudyPlanUseCase::new(self.gateway.clone());
        match command {
            PlanCommand::Generate {
                syllabus,
                start,
                end,
                hours,
                force,
                output,
            } => {
                let bytes = std::fs::read(&syllabus)
                    .with_context(|| format!("Failed to read {}", syllabus.display()))?;
                let request = PlanRequest {
                    syllabus_name: file_name(&syllabus),
                    syllabus: bytes,
                    start_date: start,
                    end_date: end,
                    study_hours: hours,
                    force,
                };

                let calendar = match plans.generate(request, self.progress.as_ref()).await {
                    Ok(calendar) => calendar,
                    Err(StudyError::NotASyllabus(warning)) => {
                        eprintln!("{} {}", "Warning:".color(self.palette.warning), warning);
                        bail!("Re-run with --force to build a plan from this file anyway");
                    }
                    Err(e) => return Err(e.into()),
                };

                save_plan(&calendar, &output)?;
                println!("{}", ConsoleFormatter::format_plan(&calendar, self.palette));
                println!("Saved to {}", output.display());
                Ok(())
            }
            PlanCommand::Show { plan, month, date } => {
                let calendar = load_plan(&plan)?;
                if let Some(date) = date {
                    println!(
                        "{}",
                        ConsoleFormatter::format_day(&calendar, date, self.palette)
                    );
                    return Ok(());
                }

                let grid = match month {
                    Some(month) => parse_month(&month)?,
                    None => match calendar.first_date() {
                        Some(first) => MonthGrid::containing(first),
                        None => {
                            println!("This plan has no study days.");
                            return Ok(());
                        }
                    },
                };
                println!(
                    "{}",
                    ConsoleFormatter::format_month(&calendar, &grid, self.palette)
                );
                if month_is_default(&calendar, &grid) {
                    println!();
                    println!("{}", ConsoleFormatter::format_plan(&calendar, self.palette));
                }
                Ok(())
            }
            PlanCommand::Export { plan } => {
                let calendar = load_plan(&plan)?;
                self.progress.on_request_start("Exporting to calendar");
                let outcome = plans.export(&calendar).await;
                self.progress
                    .on_request_end("Exporting to calendar", outcome.is_ok());
                match outcome? {
                    ExportOutcome::Exported { events } => {
                        println!("Added {events} study sessions to your calendar.");
                    }
                    ExportOutcome::AuthorizationRequired { url } => {
                        println!("Authorize calendar access first:");
                        println!("  {url}");
                        println!("Then run this command again.");
                    }
                }
                Ok(())
            }
            PlanCommand::Pdf { plan, output } => {
                let calendar = load_plan(&plan)?;
                self.progress.on_request_start("Rendering PDF");
                let result = plans.download_pdf(&calendar).await;
                self.progress.on_request_end("Rendering PDF", result.is_ok());
                let bytes = result?;
                std::fs::write(&output, &bytes)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                info!("Wrote {} bytes to {}", bytes.len(), output.display());
                println!("Saved to {}", output.display());
                Ok(())
            }
        }
    }
}

/// `3` as shown in `history list` -> index 2
fn position(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .context("Chat numbers start at 1")
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_exam(path: &Path) -> Result<ExamPaper> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let paper = ExamPaper::from_json(&text)
        .with_context(|| format!("{} is not a valid exam file", path.display()))?;
    if paper.questions.is_empty() {
        bail!("{} has no questions", path.display());
    }
    Ok(paper)
}

fn load_plan(path: &Path) -> Result<StudyCalendar> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid study plan", path.display()))
}

fn save_plan(calendar: &StudyCalendar, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(calendar)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// `2026-10` -> the October 2026 grid
fn parse_month(value: &str) -> Result<MonthGrid> {
    let (year, month) = value
        .split_once('-')
        .with_context(|| format!("Expected YYYY-MM, got {value:?}"))?;
    let year: i32 = year
        .parse()
        .with_context(|| format!("Invalid year in {value:?}"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month in {value:?}"))?;
    Ok(MonthGrid::new(year, month)?)
}

fn month_is_default(calendar: &StudyCalendar, grid: &MonthGrid) -> bool {
    calendar
        .first_date()
        .is_some_and(|first| MonthGrid::containing(first) == *grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use medbot_domain::StudyTask;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn plan_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study_plan.json");

        let mut calendar = StudyCalendar::new();
        calendar.insert(
            date(2026, 10, 2),
            StudyTask::new("Cardiac cycle").with_category("Physiology"),
        );
        calendar.insert(date(2026, 10, 3), StudyTask::new("Heart sounds"));
        save_plan(&calendar, &path).unwrap();

        let loaded = load_plan(&path).unwrap();
        assert_eq!(loaded, calendar);
        assert_eq!(loaded.topics_on(date(2026, 10, 2)), vec!["Cardiac cycle"]);
    }

    #[test]
    fn load_plan_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_plan(&path).unwrap_err();
        assert!(err.to_string().contains("is not a valid study plan"));
        assert!(load_plan(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn load_exam_rejects_empty_papers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.json");
        std::fs::write(&path, r#"{"questions": []}"#).unwrap();

        let err = load_exam(&path).unwrap_err();
        assert!(err.to_string().contains("has no questions"));
    }

    #[test]
    fn load_exam_reads_questions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.json");
        std::fs::write(
            &path,
            r#"{"questions": [{"question": "Which valve closes first?",
                "options": ["Mitral", "Aortic"], "correct_answer": 0}]}"#,
        )
        .unwrap();

        let paper = load_exam(&path).unwrap();
        assert_eq!(paper.questions.len(), 1);
    }

    #[test]
    fn parses_months() {
        assert_eq!(parse_month("2026-10").unwrap(), MonthGrid::new(2026, 10).unwrap());
        assert!(parse_month("2026").is_err());
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("twenty-10").is_err());
    }

    #[test]
    fn default_month_follows_first_study_day() {
        let mut calendar = StudyCalendar::new();
        calendar.insert(date(2026, 11, 4), StudyTask::new("Renal clearance"));

        assert!(month_is_default(&calendar, &MonthGrid::new(2026, 11).unwrap()));
        assert!(!month_is_default(&calendar, &MonthGrid::new(2026, 12).unwrap()));
        assert!(!month_is_default(&StudyCalendar::new(), &MonthGrid::new(2026, 11).unwrap()));
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(position(1).unwrap(), 0);
        assert!(position(0).is_err());
    }

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name(Path::new("/tmp/docs/syllabus.pdf")), "syllabus.pdf");
    }
}
