//! CLI command definitions

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use medbot_domain::{StudyMode, Theme};
use std::path::PathBuf;

/// CLI arguments for medbot
#[derive(Parser, Debug)]
#[command(name = "medbot")]
#[command(author, version, about = "MedBot AI - a study assistant for medical students")]
#[command(long_about = r#"
MedBot AI answers medical questions and builds study material: flashcards,
practice exams and study plans from a course syllabus.

Running without a command starts an interactive chat.

Configuration files are loaded from (in priority order):
1. --config <path>           Explicit config file
2. MEDBOT_SECTION__KEY       Environment variables
3. ./medbot.toml             Project-level config
4. ~/.config/medbot/config.toml   Global config

Example:
  medbot chat "What does the SA node do?"
  medbot flashcards "cardiac cycle" --count 15
  medbot exam generate anatomy --difficulty hard
  medbot plan generate syllabus.pdf --start 2026-09-01 --end 2026-12-15
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat with MedBot (interactive unless a message is given)
    Chat {
        /// Send a single message and print the reply
        message: Option<String>,
    },

    /// Manage saved chats
    #[command(subcommand)]
    History(HistoryCommand),

    /// Generate and study flashcards on a topic
    Flashcards(FlashcardsArgs),

    /// Practice exams
    #[command(subcommand)]
    Exam(ExamCommand),

    /// Study plans built from a course syllabus
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },

    /// Turn text into speech and print the audio URL
    Speak {
        text: String,
    },

    /// List the study tools
    Tools,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List saved chats, most recent first
    List,
    /// Print a saved chat
    Show {
        /// Position in the list (1 = most recent)
        number: usize,
    },
    /// Delete a saved chat
    Delete {
        /// Position in the list (1 = most recent)
        number: usize,
    },
    /// Delete every saved chat
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct FlashcardsArgs {
    /// Topic to study, e.g. "cranial nerves"
    pub topic: String,

    /// Number of cards to generate
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    #[arg(long)]
    pub university: Option<String>,

    #[arg(long)]
    pub course: Option<String>,

    /// beginner, intermediate or advanced
    #[arg(long)]
    pub difficulty: Option<String>,

    /// Initial study mode
    #[arg(long, default_value = "cards")]
    pub mode: StudyMode,

    /// Print the deck instead of opening the viewer
    #[arg(long)]
    pub print: bool,
}

#[derive(Subcommand, Debug)]
pub enum ExamCommand {
    /// Stream a generated practice exam
    Generate {
        /// Course the exam covers
        course: String,

        /// Exam type, e.g. final or midterm
        #[arg(long = "type", default_value = "final")]
        exam_type: String,

        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
    },

    /// Take a structured exam from a JSON file
    Take {
        /// `{"questions": [...]}` or a bare list of questions
        file: PathBuf,

        /// Have the server grade the attempt as well
        #[arg(long)]
        grade: bool,
    },

    /// Rate a generated exam
    Feedback {
        #[arg(value_enum)]
        rating: Rating,

        #[arg(short, long)]
        comments: Option<String>,

        #[arg(long)]
        student_id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Build a plan from a PDF syllabus
    Generate {
        /// Syllabus PDF
        syllabus: PathBuf,

        /// First study day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last study day (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Study hours per day
        #[arg(long, default_value_t = 2)]
        hours: u32,

        /// Continue even if the file does not look like a syllabus
        #[arg(long)]
        force: bool,

        /// Where to save the plan
        #[arg(short, long, default_value = "study_plan.json")]
        output: PathBuf,
    },

    /// Print a saved plan
    Show {
        #[arg(default_value = "study_plan.json")]
        plan: PathBuf,

        /// Show a month grid (YYYY-MM)
        #[arg(long, value_name = "YYYY-MM")]
        month: Option<String>,

        /// Show the topics for one day
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Add a saved plan to Google Calendar
    Export {
        #[arg(default_value = "study_plan.json")]
        plan: PathBuf,
    },

    /// Download a saved plan as PDF
    Pdf {
        #[arg(default_value = "study_plan.json")]
        plan: PathBuf,

        #[arg(short, long, default_value = "study_plan.pdf")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Toggle,
    Dark,
    Light,
}

impl ThemeAction {
    /// The theme to switch to from `current`.
    pub fn apply(self, current: Theme) -> Theme {
        match self {
            ThemeAction::Toggle => current.toggled(),
            ThemeAction::Dark => Theme::Dark,
            ThemeAction::Light => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rating {
    Good,
    Bad,
}
