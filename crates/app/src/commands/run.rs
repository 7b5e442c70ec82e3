//! The `exam run` command: an interactive exam driven from stdin.

use std::sync::Arc;

use anyhow::{Context, Result};
use exam_core::model::{ExamConfigDraft, QuestionNumber, QuestionTypeFilter, ReviewFilter};
use exam_core::sections;
use exam_core::time::format_countdown;
use services::{ExamServices, ExamStore, ExamView, QuestionBank, TokioTicks};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::info;

use crate::RunArgs;
use crate::render;

const HELP: &str = "\
commands:
  1..9       choose an answer
  d          defer / undefer the current question
  n, p       next / previous question
  g N        open question N
  r          review list
  f FILTER   review filter: all, answered, unanswered, deferred
  x          close the review list
  c, b       at a section checkpoint: continue / back to section start
  finish     end the exam now
  q          quit without finishing
";

pub async fn execute(db_url: &str, args: RunArgs) -> Result<()> {
    let services = ExamServices::new_sqlite(db_url).await?;

    let mut bank = QuestionBank::from_path(&args.bank)
        .with_context(|| format!("loading question bank {}", args.bank.display()))?;
    if let Some(seed) = args.seed {
        bank = bank.with_seed(seed);
    }
    info!(questions = bank.len(), "question bank loaded");

    let prefs = services.preferences().load().await?;
    let draft = apply_overrides(prefs.to_draft(), &args);

    let (ticks, mut tick_rx) = TokioTicks::channel(Handle::current());
    let mut store = ExamStore::new(Arc::new(bank), Arc::new(ticks));
    services.snapshots().restore_into(&mut store).await?;
    store.initialize_exam(draft)?;

    print!("{}", render::screen(&store));
    println!("(h for help)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !store.is_completed() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Help) => print!("{HELP}"),
                    Some(input) => {
                        apply(&mut store, input);
                        print!("{}", render::screen(&store));
                    }
                    None => println!("unrecognised command, h for help"),
                }
            }
            Some(tick) = tick_rx.recv() => {
                store.handle_tick(tick);
                if store.is_completed() {
                    println!("Time is up.");
                    print!("{}", render::screen(&store));
                } else if announce(store.time_remaining()) {
                    println!("{} left", format_countdown(store.time_remaining()));
                }
            }
        }
    }

    store.stop_timer();
    services.snapshots().persist_if_dirty(&mut store).await?;
    Ok(())
}

fn apply_overrides(mut draft: ExamConfigDraft, args: &RunArgs) -> ExamConfigDraft {
    if let Some(mode) = args.mode {
        draft.exam_mode = Some(mode);
    }
    if let Some(timer) = args.timer {
        draft.timer_mode = Some(timer);
    }
    if let Some(minutes) = args.minutes {
        draft.timer_duration = Some(minutes);
    }
    if let Some(kind) = args.question_type {
        draft.question_type_filter = Some(QuestionTypeFilter::Specific);
        draft.selected_question_type = Some(kind);
    }
    if args.all_types {
        draft.question_type_filter = Some(QuestionTypeFilter::All);
        draft.selected_question_type = None;
    }
    if let Some(order) = args.rc_order {
        draft.rc_question_order = Some(order);
    }
    if args.no_shuffle {
        draft.shuffle_questions = Some(false);
    }
    if args.shuffle_choices {
        draft.shuffle_choices = Some(true);
    }
    draft
}

/// Print the countdown on whole minutes and through the last ten seconds.
fn announce(remaining: u32) -> bool {
    remaining > 0 && (remaining % 60 == 0 || remaining <= 10)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    /// 1-based choice.
    Choice(usize),
    Defer,
    Next,
    Previous,
    /// 1-based question number.
    Open(u32),
    Review,
    Filter(ReviewFilter),
    CloseReview,
    Continue,
    Back,
    Finish,
    Help,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let head = words.next()?;
        let arg = words.next();
        if words.next().is_some() {
            return None;
        }
        let input = match (head, arg) {
            ("d", None) => Self::Defer,
            ("n", None) => Self::Next,
            ("p", None) => Self::Previous,
            ("g", Some(n)) => Self::Open(n.parse().ok().filter(|n| *n > 0)?),
            ("r", None) => Self::Review,
            ("f", Some(filter)) => Self::Filter(filter.parse().ok()?),
            ("x", None) => Self::CloseReview,
            ("c", None) => Self::Continue,
            ("b", None) => Self::Back,
            ("finish", None) => Self::Finish,
            ("h" | "help", None) => Self::Help,
            ("q" | "quit", None) => Self::Quit,
            (n, None) => Self::Choice(n.parse().ok().filter(|n| *n > 0)?),
            _ => return None,
        };
        Some(input)
    }
}

/// Map one command onto store operations for the current view.
fn apply(store: &mut ExamStore, input: Input) {
    let view = store.view();
    match input {
        Input::Choice(choice) if view == ExamView::Question => {
            if let Some(number) = store.current_question().map(|q| q.number()) {
                store.select_answer(number, choice - 1);
            }
        }
        Input::Defer if view == ExamView::Question => {
            if let Some(number) = store.current_question().map(|q| q.number()) {
                store.toggle_deferred(number);
            }
        }
        Input::Next if view == ExamView::Question => {
            match store.first_deferred_index() {
                Some(index) if store.is_last_question() => store.go_to_question(index),
                _ => store.next_question(),
            }
        }
        Input::Previous if view == ExamView::Question => store.previous_question(),
        Input::Open(number) => open_question(store, QuestionNumber::new(number)),
        Input::Review if view == ExamView::Question => store.set_review_mode(true),
        Input::Filter(filter) => store.set_review_filter(filter),
        Input::CloseReview => store.exit_review_mode(),
        Input::Continue if view == ExamView::SectionReview => {
            if store.is_last_section() {
                store.complete_exam();
            } else {
                store.exit_section_review();
            }
        }
        Input::Back if view == ExamView::SectionReview => {
            let start = sections::section_range(store.current_section(), store.questions().len())
                .start;
            store.exit_section_review();
            store.go_to_question(start);
        }
        Input::Finish => store.complete_exam(),
        _ => {}
    }
}

fn open_question(store: &mut ExamStore, number: QuestionNumber) {
    let Some(index) = store.questions().iter().position(|q| q.number() == number) else {
        return;
    };
    if store.is_section_review() {
        store.exit_section_review();
    }
    store.go_to_question(index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ExamMode, QuestionRecord, QuestionType, TimerMode};
    use services::ManualTicks;
    use std::path::PathBuf;

    fn store(n: u32) -> ExamStore {
        let records = (1..=n)
            .map(|i| QuestionRecord {
                id: None,
                question_number: i,
                question_type: QuestionType::Error,
                question: format!("Sentence {i}"),
                choices: vec!["one".into(), "two".into(), "three".into(), "four".into()],
                passage: None,
                answer: 3,
            })
            .collect();
        let mut store = ExamStore::new(
            Arc::new(QuestionBank::new(records)),
            Arc::new(ManualTicks::new()),
        );
        store
            .initialize_exam(ExamConfigDraft {
                shuffle_questions: Some(false),
                ..ExamConfigDraft::default()
            })
            .unwrap();
        store
    }

    fn args() -> RunArgs {
        RunArgs {
            bank: PathBuf::from("bank.json"),
            mode: None,
            timer: None,
            minutes: None,
            question_type: None,
            all_types: false,
            rc_order: None,
            no_shuffle: false,
            shuffle_choices: false,
            seed: None,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("2"), Some(Input::Choice(2)));
        assert_eq!(Input::parse("  g 14 "), Some(Input::Open(14)));
        assert_eq!(Input::parse("f deferred"), Some(Input::Filter(ReviewFilter::Deferred)));
        assert_eq!(Input::parse("finish"), Some(Input::Finish));
        assert_eq!(Input::parse("0"), None);
        assert_eq!(Input::parse("g"), None);
        assert_eq!(Input::parse("f later"), None);
        assert_eq!(Input::parse("n n"), None);
        assert_eq!(Input::parse(""), None);
    }

    #[test]
    fn choice_numbers_are_one_based() {
        let mut store = store(3);
        apply(&mut store, Input::Choice(4));
        assert_eq!(store.answer_for(QuestionNumber::new(1)), Some(3));
        assert_eq!(store.question_stats().correct, 1);
    }

    #[test]
    fn next_on_last_question_visits_deferred_first() {
        let mut store = store(3);
        apply(&mut store, Input::Next);
        apply(&mut store, Input::Defer);
        apply(&mut store, Input::Next);
        assert_eq!(store.current_index(), 2);

        apply(&mut store, Input::Next);
        assert_eq!(store.current_index(), 1);
        assert!(!store.is_completed());

        apply(&mut store, Input::Choice(1));
        apply(&mut store, Input::Open(3));
        apply(&mut store, Input::Next);
        assert!(store.is_completed());
    }

    #[test]
    fn checkpoint_back_and_continue() {
        let mut store = store(20);
        apply(&mut store, Input::Open(13));
        apply(&mut store, Input::Next);
        assert_eq!(store.view(), ExamView::SectionReview);

        apply(&mut store, Input::Back);
        assert_eq!(store.view(), ExamView::Question);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_section(), 1);

        apply(&mut store, Input::Open(13));
        apply(&mut store, Input::Next);
        apply(&mut store, Input::Continue);
        assert_eq!(store.current_index(), 13);
        assert_eq!(store.current_section(), 2);
    }

    #[test]
    fn checkpoint_jump_opens_the_question() {
        let mut store = store(20);
        apply(&mut store, Input::Open(13));
        apply(&mut store, Input::Next);
        apply(&mut store, Input::Open(5));
        assert_eq!(store.view(), ExamView::Question);
        assert_eq!(store.current_index(), 4);
        assert_eq!(store.current_section(), 1);
    }

    #[test]
    fn review_list_round_trip() {
        let mut store = store(3);
        apply(&mut store, Input::Review);
        assert_eq!(store.view(), ExamView::Review);
        apply(&mut store, Input::Filter(ReviewFilter::Unanswered));
        assert_eq!(store.review_questions().len(), 3);
        apply(&mut store, Input::Open(2));
        assert_eq!(store.view(), ExamView::Question);
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn flags_override_preferences() {
        let mut run = args();
        run.mode = Some(ExamMode::Single);
        run.timer = Some(TimerMode::Total);
        run.minutes = Some(5);
        run.question_type = Some(QuestionType::ReadingComprehension);
        run.no_shuffle = true;

        let config = apply_overrides(ExamConfigDraft::default(), &run).normalize();
        assert_eq!(config.exam_mode, ExamMode::Single);
        assert_eq!(config.timer_budget_secs(), 300);
        assert_eq!(config.type_filter(), Some(QuestionType::ReadingComprehension));
        assert!(!config.shuffle_questions);
        assert!(!config.shuffle_choices);
    }

    #[test]
    fn countdown_announcements() {
        assert!(announce(120));
        assert!(announce(10));
        assert!(!announce(61));
        assert!(!announce(0));
    }
}
