//! Terminal front end for timed verbal-aptitude practice exams.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use exam_core::model::{ExamMode, QuestionType, QuestionTypeFilter, RcQuestionOrder, TimerMode};
use tracing_subscriber::EnvFilter;

mod commands;
mod db;
mod render;

#[derive(Parser)]
#[command(name = "exam", version, about = "Timed verbal-aptitude practice exams")]
struct Cli {
    /// SQLite URL or file path (falls back to EXAM_DB_URL, then ./exam.sqlite3)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam drawn from a JSON question bank
    Run(RunArgs),

    /// Show or change the stored exam preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// List completed exams
    History {
        /// Delete all stored results
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Question bank: a JSON array of question records
    #[arg(long)]
    pub bank: PathBuf,

    /// Exam mode: sectioned or single
    #[arg(long)]
    pub mode: Option<ExamMode>,

    /// Timer mode: none or total
    #[arg(long)]
    pub timer: Option<TimerMode>,

    /// Timer budget in minutes
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Restrict to one question type (analogy, completion, error, rc, odd)
    #[arg(long = "type", conflicts_with = "all_types")]
    pub question_type: Option<QuestionType>,

    /// Include every question type regardless of stored preferences
    #[arg(long)]
    pub all_types: bool,

    /// Reading-comprehension order: sequential or random
    #[arg(long)]
    pub rc_order: Option<RcQuestionOrder>,

    /// Keep the bank's question order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Shuffle the choices of every question
    #[arg(long)]
    pub shuffle_choices: bool,

    /// RNG seed for reproducible ordering
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the stored preferences
    Show,

    /// Update one or more preferences
    Set(SettingsSetArgs),
}

#[derive(Args, Debug, Default)]
pub struct SettingsSetArgs {
    #[arg(long)]
    pub mode: Option<ExamMode>,

    #[arg(long)]
    pub timer: Option<TimerMode>,

    #[arg(long)]
    pub minutes: Option<u32>,

    /// all or specific
    #[arg(long)]
    pub type_filter: Option<QuestionTypeFilter>,

    #[arg(long = "type")]
    pub question_type: Option<QuestionType>,

    #[arg(long)]
    pub rc_order: Option<RcQuestionOrder>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = async move {
        let db_url = db::resolve_url(cli.db)?;
        db::prepare_sqlite_file(&db_url)?;
        match cli.command {
            Commands::Run(args) => commands::run::execute(&db_url, args).await,
            Commands::Settings { action } => commands::settings::execute(&db_url, action).await,
            Commands::History { clear } => commands::history::execute(&db_url, clear).await,
        }
    }
    .await;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
