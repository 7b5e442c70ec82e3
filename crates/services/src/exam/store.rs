use std::fmt;
use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::stats::{self, is_deferred};
use exam_core::model::{
    AnswerMap, DeferMap, ExamConfig, ExamConfigDraft, ExamMode, ExamResults, ExamSnapshot,
    Question, QuestionNumber, QuestionStats, ReviewFilter, SectionStats,
};
use exam_core::sections::{self, SECTION_SIZE};
use tracing::{debug, info, trace, warn};

use super::timer::{Tick, TickGuard, TickSource};
use super::view::{ExamInfo, ExamView};
use crate::error::ExamError;
use crate::source::QuestionSource;

//
// ─── LIVE SESSION ──────────────────────────────────────────────────────────────
//

/// Everything that belongs to one exam attempt and is never persisted.
#[derive(Debug)]
struct SessionState {
    started: bool,
    completed: bool,
    exam_mode: ExamMode,
    questions: Vec<Question>,
    answers: AnswerMap,
    deferred: DeferMap,
    current_index: usize,
    current_section: u32,
    section_review_mode: bool,
    review_mode: bool,
    review_filter: ReviewFilter,
    timer_active: bool,
    time_remaining: u32,
    results: Option<ExamResults>,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            started: false,
            completed: false,
            exam_mode: ExamMode::default(),
            questions: Vec::new(),
            answers: AnswerMap::new(),
            deferred: DeferMap::new(),
            current_index: 0,
            current_section: 1,
            section_review_mode: false,
            review_mode: false,
            review_filter: ReviewFilter::All,
            timer_active: false,
            time_remaining: 0,
            results: None,
        }
    }

    fn is_running(&self) -> bool {
        self.started && !self.completed
    }

    fn move_to(&mut self, index: usize) {
        if let Some(question) = self.questions.get(index) {
            self.current_section = question.section();
            self.current_index = index;
        }
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Exam session state machine.
///
/// Owns the question sequence, answers and defer flags, section checkpoints,
/// the countdown timer, and scoring. Configuration and result history are the
/// only parts that outlive an attempt; see [`ExamStore::snapshot`].
pub struct ExamStore {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    ticks: Arc<dyn TickSource>,
    config: ExamConfig,
    session: SessionState,
    timer: Option<TickGuard>,
    timer_generation: u64,
    result_history: Vec<ExamResults>,
    unsaved: bool,
}

impl ExamStore {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, ticks: Arc<dyn TickSource>) -> Self {
        Self {
            clock: Clock::default(),
            source,
            ticks,
            config: ExamConfig::default(),
            session: SessionState::fresh(),
            timer: None,
            timer_generation: 0,
            result_history: Vec::new(),
            unsaved: false,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Seed configuration and history from a persisted snapshot.
    pub fn restore(&mut self, snapshot: ExamSnapshot) {
        self.config = snapshot.config;
        self.result_history = snapshot.result_history;
        self.unsaved = false;
    }

    /// The persistable part of the store: configuration and result history.
    #[must_use]
    pub fn snapshot(&self) -> ExamSnapshot {
        ExamSnapshot {
            config: self.config.clone(),
            result_history: self.result_history.clone(),
            discarded_results: 0,
        }
    }

    /// True when configuration or history changed since the last save.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    #[must_use]
    pub fn config(&self) -> &ExamConfig {
        &self.config
    }

    /// Replace the stored configuration. A running exam keeps the mode it
    /// was started with.
    pub fn set_config(&mut self, config: ExamConfig) {
        if self.config != config {
            self.config = config;
            self.unsaved = true;
        }
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Start a new exam from `draft`.
    ///
    /// Questions are requested from the source, renumbered from 1 and split
    /// into sections of 13. Any previous attempt and timer are discarded.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` if the source fails, yields no questions, or yields
    /// an inconsistent question. The live session is reset before returning.
    pub fn initialize_exam(&mut self, draft: ExamConfigDraft) -> Result<(), ExamError> {
        let config = draft.normalize();
        debug!(?config, "initializing exam");

        let questions = match self.issue_questions(&config) {
            Ok(questions) => questions,
            Err(err) => {
                warn!(error = %err, "exam initialization failed");
                self.stop_timer();
                self.session = SessionState::fresh();
                return Err(err);
            }
        };

        self.stop_timer();

        let timed = config.is_timed();
        let mut session = SessionState::fresh();
        session.started = true;
        session.exam_mode = config.exam_mode;
        session.time_remaining = config.timer_budget_secs();
        session.questions = questions;
        self.session = session;

        info!(
            questions = self.session.questions.len(),
            sections = self.total_sections(),
            mode = %config.exam_mode,
            timer_secs = self.session.time_remaining,
            "exam initialized"
        );

        self.set_config(config);
        if timed {
            self.start_timer();
        }
        Ok(())
    }

    fn issue_questions(&self, config: &ExamConfig) -> Result<Vec<Question>, ExamError> {
        let records = self.source.generate(config)?;
        if records.is_empty() {
            return Err(ExamError::NoQuestions);
        }
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Question::issue(record, index).map_err(ExamError::from))
            .collect()
    }

    /// Stop the timer and score the attempt.
    ///
    /// Does nothing when no exam is running, so results are produced and
    /// appended to history once per attempt.
    pub fn complete_exam(&mut self) {
        if !self.session.is_running() {
            debug!("complete_exam ignored: no running exam");
            return;
        }
        self.stop_timer();

        let results = ExamResults::score(
            &self.session.questions,
            &self.session.answers,
            &self.session.deferred,
            self.clock.now(),
        );
        info!(
            total = results.total_questions(),
            correct = results.correct_answers(),
            incorrect = results.incorrect_answers(),
            unanswered = results.unanswered_questions(),
            "exam completed"
        );

        self.result_history.push(results.clone());
        self.session.results = Some(results);
        self.session.completed = true;
        self.session.section_review_mode = false;
        self.session.review_mode = false;
        self.unsaved = true;
    }

    /// Discard the live session. Configuration and history are kept.
    pub fn reset_exam(&mut self) {
        self.stop_timer();
        self.session = SessionState::fresh();
        debug!("exam state reset");
    }

    pub fn clear_result_history(&mut self) {
        if !self.result_history.is_empty() {
            self.result_history.clear();
            self.unsaved = true;
        }
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Record `choice` for a question and clear its defer flag.
    ///
    /// Unknown questions and out-of-range choices are ignored.
    pub fn select_answer(&mut self, number: QuestionNumber, choice: usize) {
        if !self.session.is_running() {
            return;
        }
        let Some(question) = self.question_by_number(number) else {
            debug!(%number, "select_answer ignored: unknown question");
            return;
        };
        if choice >= question.choices().len() {
            debug!(%number, choice, "select_answer ignored: choice out of range");
            return;
        }
        self.session.answers.insert(number, choice);
        self.session.deferred.insert(number, false);
    }

    /// Flip the defer flag of a question, answered or not.
    pub fn toggle_deferred(&mut self, number: QuestionNumber) {
        if !self.session.is_running() || self.question_by_number(number).is_none() {
            return;
        }
        let flag = self.session.deferred.entry(number).or_insert(false);
        *flag = !*flag;
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Advance to the next question.
    ///
    /// In sectioned mode, leaving the last question of a section while more
    /// remain opens the section checkpoint instead of moving. On the last
    /// question this completes the exam.
    pub fn next_question(&mut self) {
        if !self.session.is_running() {
            return;
        }
        let current = self.session.current_index;
        let next = current + 1;
        let len = self.session.questions.len();

        if self.session.exam_mode == ExamMode::Sectioned
            && sections::is_section_end(current)
            && next < len
        {
            self.session.section_review_mode = true;
            return;
        }

        if next < len {
            self.session.move_to(next);
        } else {
            self.complete_exam();
        }
    }

    pub fn previous_question(&mut self) {
        if !self.session.is_running() {
            return;
        }
        if let Some(prev) = self.session.current_index.checked_sub(1) {
            self.session.move_to(prev);
        }
    }

    /// Jump to `index` and leave the overall review list. Out-of-range
    /// indices are ignored.
    pub fn go_to_question(&mut self, index: usize) {
        if !self.session.is_running() || index >= self.session.questions.len() {
            return;
        }
        self.session.move_to(index);
        self.session.review_mode = false;
    }

    /// Leave the section checkpoint and move to the first question of the
    /// next section, or to the last question if there is none.
    pub fn exit_section_review(&mut self) {
        if !self.session.is_running() {
            return;
        }
        let len = self.session.questions.len();
        let next = usize::try_from(self.session.current_section)
            .unwrap_or(usize::MAX)
            .saturating_mul(SECTION_SIZE);

        self.session.section_review_mode = false;
        if next < len {
            self.session.current_index = next;
            self.session.current_section += 1;
        } else {
            self.session.current_index = len.saturating_sub(1);
        }
    }

    //
    // ─── REVIEW LIST ───────────────────────────────────────────────────────────
    //

    pub fn set_review_mode(&mut self, enabled: bool) {
        if self.session.is_running() {
            self.session.review_mode = enabled;
        }
    }

    pub fn exit_review_mode(&mut self) {
        self.session.review_mode = false;
    }

    pub fn set_review_filter(&mut self, filter: ReviewFilter) {
        self.session.review_filter = filter;
    }

    #[must_use]
    pub fn review_filter(&self) -> ReviewFilter {
        self.session.review_filter
    }

    /// Questions matching the review filter, with their exam index.
    #[must_use]
    pub fn review_questions(&self) -> Vec<(usize, &Question)> {
        let filter = self.session.review_filter;
        self.session
            .questions
            .iter()
            .enumerate()
            .filter(|(_, q)| filter.matches(q, &self.session.answers, &self.session.deferred))
            .collect()
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────────
    //

    /// Start the countdown, replacing any running tick source. Does nothing
    /// when no exam is running.
    pub fn start_timer(&mut self) {
        if !self.session.is_running() {
            debug!("start_timer ignored: no running exam");
            return;
        }
        if let Some(previous) = self.timer.take() {
            previous.cancel();
        }
        self.timer_generation += 1;
        self.timer = Some(self.ticks.start(self.timer_generation));
        self.session.timer_active = true;
    }

    /// Stop the countdown. Stopping a stopped timer does nothing.
    pub fn stop_timer(&mut self) {
        if let Some(guard) = self.timer.take() {
            guard.cancel();
        }
        self.session.timer_active = false;
    }

    /// Apply a tick delivered by the tick source. Ticks from a cancelled
    /// timer are dropped.
    pub fn handle_tick(&mut self, tick: Tick) {
        if self.timer.is_none() || tick.generation() != self.timer_generation {
            trace!(generation = tick.generation(), "stale tick dropped");
            return;
        }
        self.tick();
    }

    /// One second elapsed. The tick that reaches zero completes the exam.
    pub fn tick(&mut self) {
        if !self.session.timer_active || !self.session.is_running() {
            return;
        }
        if self.session.time_remaining <= 1 {
            self.session.time_remaining = 0;
            info!("time is up");
            self.complete_exam();
        } else {
            self.session.time_remaining -= 1;
        }
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.session.started
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.session.completed
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.session.questions
    }

    #[must_use]
    pub fn user_answers(&self) -> &AnswerMap {
        &self.session.answers
    }

    #[must_use]
    pub fn deferred_questions(&self) -> &DeferMap {
        &self.session.deferred
    }

    #[must_use]
    pub fn answer_for(&self, number: QuestionNumber) -> Option<usize> {
        self.session.answers.get(&number).copied()
    }

    #[must_use]
    pub fn is_deferred(&self, number: QuestionNumber) -> bool {
        is_deferred(&self.session.deferred, number)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    #[must_use]
    pub fn current_section(&self) -> u32 {
        self.session.current_section
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.questions.get(self.session.current_index)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.session.current_index + 1 >= self.session.questions.len()
    }

    #[must_use]
    pub fn is_section_review(&self) -> bool {
        self.session.section_review_mode
    }

    #[must_use]
    pub fn is_review_mode(&self) -> bool {
        self.session.review_mode
    }

    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.session.timer_active
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.session.time_remaining
    }

    #[must_use]
    pub fn results(&self) -> Option<&ExamResults> {
        self.session.results.as_ref()
    }

    #[must_use]
    pub fn result_history(&self) -> &[ExamResults] {
        &self.result_history
    }

    #[must_use]
    pub fn view(&self) -> ExamView {
        let s = &self.session;
        if s.completed {
            ExamView::Results
        } else if !s.started {
            ExamView::NotStarted
        } else if s.section_review_mode {
            ExamView::SectionReview
        } else if s.review_mode {
            ExamView::Review
        } else {
            ExamView::Question
        }
    }

    //
    // ─── DERIVED ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn question_stats(&self) -> QuestionStats {
        QuestionStats::compute(
            &self.session.questions,
            &self.session.answers,
            &self.session.deferred,
        )
    }

    #[must_use]
    pub fn section_stats(&self, section: u32) -> SectionStats {
        SectionStats::compute(
            section,
            &self.session.questions,
            &self.session.answers,
            &self.session.deferred,
        )
    }

    #[must_use]
    pub fn total_sections(&self) -> u32 {
        sections::total_sections(self.session.questions.len())
    }

    #[must_use]
    pub fn is_last_section(&self) -> bool {
        self.session.current_section >= self.total_sections()
    }

    /// Questions (with exam index) of `section`, in exam order.
    #[must_use]
    pub fn section_questions(&self, section: u32) -> Vec<(usize, &Question)> {
        let range = sections::section_range(section, self.session.questions.len());
        let start = range.start;
        self.session.questions[range]
            .iter()
            .enumerate()
            .map(|(offset, q)| (start + offset, q))
            .collect()
    }

    #[must_use]
    pub fn first_deferred_index(&self) -> Option<usize> {
        self.session
            .questions
            .iter()
            .position(|q| is_deferred(&self.session.deferred, q.number()))
    }

    #[must_use]
    pub fn correct_answers(&self) -> Vec<QuestionNumber> {
        stats::correct_answers(&self.session.questions, &self.session.answers)
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> Vec<QuestionNumber> {
        stats::incorrect_answers(&self.session.questions, &self.session.answers)
    }

    #[must_use]
    pub fn unanswered_questions(&self) -> Vec<QuestionNumber> {
        stats::unanswered_questions(&self.session.questions, &self.session.answers)
    }

    #[must_use]
    pub fn exam_info(&self) -> ExamInfo {
        ExamInfo {
            question_type: self.config.type_filter(),
            exam_mode: self.session.exam_mode,
            total_questions: self.session.questions.len(),
            current_section: self.session.current_section,
            total_sections: self.total_sections(),
            rc_question_order: self.config.rc_question_order,
        }
    }

    fn question_by_number(&self, number: QuestionNumber) -> Option<&Question> {
        // Numbers are positional after issue.
        let index = usize::try_from(number.value()).ok()?.checked_sub(1)?;
        self.session
            .questions
            .get(index)
            .filter(|q| q.number() == number)
    }
}

impl fmt::Debug for ExamStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamStore")
            .field("config", &self.config)
            .field("started", &self.session.started)
            .field("completed", &self.session.completed)
            .field("questions_len", &self.session.questions.len())
            .field("current_index", &self.session.current_index)
            .field("current_section", &self.session.current_section)
            .field("timer_active", &self.session.timer_active)
            .field("time_remaining", &self.session.time_remaining)
            .field("history_len", &self.result_history.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuestionSourceError;
    use crate::exam::ManualTicks;
    use exam_core::model::{QuestionRecord, QuestionType, TimerMode};
    use exam_core::time::fixed_now;

    struct FixedSource(Vec<QuestionRecord>);

    impl QuestionSource for FixedSource {
        fn generate(&self, _: &ExamConfig) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl QuestionSource for FailingSource {
        fn generate(&self, _: &ExamConfig) -> Result<Vec<QuestionRecord>, QuestionSourceError> {
            Err(QuestionSourceError::Unavailable("bank offline".into()))
        }
    }

    fn records(n: u32) -> Vec<QuestionRecord> {
        (1..=n)
            .map(|i| QuestionRecord {
                id: Some(format!("src-{i}")),
                question_number: 500 + i,
                question_type: QuestionType::Analogy,
                question: format!("Question {i}"),
                choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                passage: None,
                answer: 0,
            })
            .collect()
    }

    fn store_with(n: u32) -> (ExamStore, ManualTicks) {
        let ticks = ManualTicks::new();
        let store = ExamStore::new(Arc::new(FixedSource(records(n))), Arc::new(ticks.clone()))
            .with_clock(Clock::fixed(fixed_now()));
        (store, ticks)
    }

    fn started(n: u32, draft: ExamConfigDraft) -> (ExamStore, ManualTicks) {
        let (mut store, ticks) = store_with(n);
        store.initialize_exam(draft).unwrap();
        (store, ticks)
    }

    fn q(n: u32) -> QuestionNumber {
        QuestionNumber::new(n)
    }

    #[test]
    fn initialize_renumbers_and_sections_questions() {
        let (store, ticks) = started(30, ExamConfigDraft::default());

        assert_eq!(store.questions().len(), 30);
        for (index, question) in store.questions().iter().enumerate() {
            assert_eq!(question.number().value() as usize, index + 1);
            assert_eq!(question.section() as usize, index / 13 + 1);
            assert_eq!(question.original_number() as usize, 501 + index);
        }
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_section(), 1);
        assert_eq!(store.total_sections(), 3);
        assert_eq!(store.view(), ExamView::Question);
        assert!(!store.timer_active());
        assert_eq!(store.time_remaining(), 0);
        assert_eq!(ticks.started(), 0);
    }

    #[test]
    fn empty_source_fails_and_resets_session() {
        let (mut store, _) = started(5, ExamConfigDraft::default());
        store.select_answer(q(1), 2);

        store.source = Arc::new(FixedSource(Vec::new()));
        let err = store.initialize_exam(ExamConfigDraft::default()).unwrap_err();

        assert!(matches!(err, ExamError::NoQuestions));
        assert!(!store.is_started());
        assert!(store.questions().is_empty());
        assert!(store.user_answers().is_empty());
        assert_eq!(store.current_section(), 1);
        assert_eq!(store.view(), ExamView::NotStarted);
    }

    #[test]
    fn failing_source_cancels_running_timer() {
        let timed = ExamConfigDraft {
            timer_mode: Some(TimerMode::Total),
            ..ExamConfigDraft::default()
        };
        let (mut store, ticks) = started(5, timed.clone());
        assert_eq!(ticks.running(), 1);

        store.source = Arc::new(FailingSource);
        let err = store.initialize_exam(timed).unwrap_err();

        assert!(matches!(err, ExamError::Source(_)));
        assert_eq!(ticks.running(), 0);
        assert!(!store.timer_active());
    }

    #[test]
    fn inconsistent_question_is_an_initialization_failure() {
        let mut bad = records(3);
        bad[1].answer = 9;
        let ticks = ManualTicks::new();
        let mut store = ExamStore::new(Arc::new(FixedSource(bad)), Arc::new(ticks));

        let err = store.initialize_exam(ExamConfigDraft::default()).unwrap_err();
        assert!(matches!(err, ExamError::InvalidQuestion(_)));
        assert!(store.questions().is_empty());
    }

    #[test]
    fn answering_clears_deferral_and_is_idempotent() {
        let (mut store, _) = started(5, ExamConfigDraft::default());

        store.toggle_deferred(q(2));
        assert!(store.is_deferred(q(2)));
        assert_eq!(store.answer_for(q(2)), None);

        store.select_answer(q(2), 1);
        assert!(!store.is_deferred(q(2)));
        let before = store.question_stats();

        store.select_answer(q(2), 1);
        assert_eq!(store.answer_for(q(2)), Some(1));
        assert_eq!(store.question_stats(), before);

        store.select_answer(q(2), 0);
        assert_eq!(store.answer_for(q(2)), Some(0));
        assert_eq!(store.question_stats().correct, 1);
    }

    #[test]
    fn invalid_answers_are_ignored() {
        let (mut store, _) = started(5, ExamConfigDraft::default());
        store.select_answer(q(99), 0);
        store.select_answer(q(1), 4);
        store.toggle_deferred(q(42));

        assert!(store.user_answers().is_empty());
        assert!(store.deferred_questions().is_empty());
    }

    #[test]
    fn stats_track_answers_and_deferrals() {
        let (mut store, _) = started(10, ExamConfigDraft::default());
        store.select_answer(q(1), 0);
        store.select_answer(q(2), 0);
        store.select_answer(q(3), 3);
        store.toggle_deferred(q(4));
        store.toggle_deferred(q(5));
        store.toggle_deferred(q(5));

        let stats = store.question_stats();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.answered, 3);
        assert_eq!(stats.unanswered, 7);
        assert_eq!(stats.answered + stats.unanswered, stats.total);
        assert_eq!(stats.deferred, 1);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(stats.percentage, 67);

        assert_eq!(store.correct_answers(), vec![q(1), q(2)]);
        assert_eq!(store.incorrect_answers(), vec![q(3)]);
        assert_eq!(store.unanswered_questions().len(), 7);
        assert_eq!(store.first_deferred_index(), Some(3));
    }

    #[test]
    fn section_end_opens_checkpoint_then_advances() {
        let (mut store, _) = started(26, ExamConfigDraft::default());
        store.go_to_question(12);
        assert_eq!(store.current_section(), 1);

        store.next_question();
        assert!(store.is_section_review());
        assert_eq!(store.current_index(), 12);
        assert_eq!(store.view(), ExamView::SectionReview);

        store.exit_section_review();
        assert_eq!(store.current_index(), 13);
        assert_eq!(store.current_section(), 2);
        assert!(!store.is_section_review());
        assert_eq!(store.view(), ExamView::Question);
    }

    #[test]
    fn single_mode_has_no_checkpoint() {
        let (mut store, _) = started(
            26,
            ExamConfigDraft {
                exam_mode: Some(ExamMode::Single),
                ..ExamConfigDraft::default()
            },
        );
        store.go_to_question(12);
        store.next_question();
        assert!(!store.is_section_review());
        assert_eq!(store.current_index(), 13);
        assert_eq!(store.current_section(), 2);
    }

    #[test]
    fn exit_section_review_clamps_in_last_section() {
        let (mut store, _) = started(20, ExamConfigDraft::default());
        store.go_to_question(15);
        assert_eq!(store.current_section(), 2);

        store.exit_section_review();
        assert_eq!(store.current_index(), 19);
        assert_eq!(store.current_section(), 2);
    }

    #[test]
    fn next_on_last_question_completes() {
        let (mut store, _) = started(3, ExamConfigDraft::default());
        store.go_to_question(2);
        assert!(store.is_last_question());

        store.next_question();
        assert!(store.is_completed());
        assert!(store.results().is_some());
        assert_eq!(store.view(), ExamView::Results);
        assert_eq!(store.result_history().len(), 1);
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn previous_is_noop_at_start_and_tracks_section() {
        let (mut store, _) = started(20, ExamConfigDraft::default());
        store.previous_question();
        assert_eq!(store.current_index(), 0);

        store.go_to_question(13);
        store.previous_question();
        assert_eq!(store.current_index(), 12);
        assert_eq!(store.current_section(), 1);
    }

    #[test]
    fn go_to_question_ignores_out_of_range_and_leaves_review() {
        let (mut store, _) = started(5, ExamConfigDraft::default());
        store.set_review_mode(true);
        assert_eq!(store.view(), ExamView::Review);

        store.go_to_question(5);
        assert_eq!(store.current_index(), 0);
        assert!(store.is_review_mode());

        store.go_to_question(4);
        assert_eq!(store.current_index(), 4);
        assert!(!store.is_review_mode());
    }

    #[test]
    fn review_list_follows_filter() {
        let (mut store, _) = started(6, ExamConfigDraft::default());
        store.select_answer(q(1), 0);
        store.toggle_deferred(q(6));

        store.set_review_filter(ReviewFilter::Deferred);
        let deferred: Vec<usize> = store.review_questions().iter().map(|(i, _)| *i).collect();
        assert_eq!(deferred, vec![5]);

        store.set_review_filter(ReviewFilter::Unanswered);
        assert_eq!(store.review_questions().len(), 5);
    }

    #[test]
    fn completion_scores_and_is_immutable() {
        let (mut store, _) = started(4, ExamConfigDraft::default());
        store.select_answer(q(1), 0);
        store.select_answer(q(2), 1);
        store.toggle_deferred(q(3));
        store.complete_exam();

        let results = store.results().unwrap().clone();
        assert_eq!(results.total_questions(), 4);
        assert_eq!(results.correct_answers(), 1);
        assert_eq!(results.incorrect_answers(), 1);
        assert_eq!(results.unanswered_questions(), 2);
        assert_eq!(
            results.correct_answers()
                + results.incorrect_answers()
                + results.unanswered_questions(),
            results.total_questions()
        );
        assert_eq!(results.completed_at(), fixed_now());
        assert!(results.detailed_results()[2].is_deferred);

        store.select_answer(q(4), 0);
        store.complete_exam();
        assert_eq!(store.results(), Some(&results));
        assert_eq!(store.result_history().len(), 1);
    }

    #[test]
    fn timer_runs_out_after_budget_and_completes_once() {
        let (mut store, ticks) = started(
            5,
            ExamConfigDraft {
                timer_mode: Some(TimerMode::Total),
                timer_duration: Some(1),
                ..ExamConfigDraft::default()
            },
        );
        assert_eq!(store.time_remaining(), 60);
        assert!(store.timer_active());
        assert_eq!(ticks.running(), 1);

        for _ in 0..59 {
            store.handle_tick(ticks.tick());
        }
        assert_eq!(store.time_remaining(), 1);
        assert!(!store.is_completed());

        store.handle_tick(ticks.tick());
        assert_eq!(store.time_remaining(), 0);
        assert!(store.is_completed());
        assert!(!store.timer_active());
        assert_eq!(ticks.running(), 0);
        assert_eq!(store.result_history().len(), 1);

        store.tick();
        store.handle_tick(ticks.tick());
        assert_eq!(store.result_history().len(), 1);
    }

    #[test]
    fn reinitializing_replaces_the_timer() {
        let timed = ExamConfigDraft {
            timer_mode: Some(TimerMode::Total),
            timer_duration: Some(2),
            ..ExamConfigDraft::default()
        };
        let (mut store, ticks) = started(5, timed.clone());
        let stale = ticks.tick();

        store.initialize_exam(timed).unwrap();
        assert_eq!(ticks.started(), 2);
        assert_eq!(ticks.running(), 1);

        store.handle_tick(stale);
        assert_eq!(store.time_remaining(), 120);
        store.handle_tick(ticks.tick());
        assert_eq!(store.time_remaining(), 119);
    }

    #[test]
    fn stop_timer_is_idempotent() {
        let (mut store, ticks) = started(
            5,
            ExamConfigDraft {
                timer_mode: Some(TimerMode::Total),
                ..ExamConfigDraft::default()
            },
        );
        store.stop_timer();
        store.stop_timer();
        assert_eq!(ticks.cancelled(), 1);
        assert!(!store.timer_active());

        let before = store.time_remaining();
        store.tick();
        assert_eq!(store.time_remaining(), before);
    }

    #[test]
    fn timer_needs_a_running_exam() {
        let (mut store, ticks) = store_with(3);
        store.start_timer();
        assert!(!store.timer_active());
        assert_eq!(ticks.started(), 0);
        assert_eq!(store.view(), ExamView::NotStarted);

        store.initialize_exam(ExamConfigDraft::default()).unwrap();
        store.complete_exam();
        store.start_timer();
        assert!(!store.timer_active());
        assert_eq!(ticks.started(), 0);
    }

    #[test]
    fn reset_keeps_history_and_config() {
        let (mut store, ticks) = started(
            3,
            ExamConfigDraft {
                exam_mode: Some(ExamMode::Single),
                timer_mode: Some(TimerMode::Total),
                ..ExamConfigDraft::default()
            },
        );
        store.complete_exam();
        store.reset_exam();

        assert_eq!(store.view(), ExamView::NotStarted);
        assert!(store.questions().is_empty());
        assert!(store.results().is_none());
        assert_eq!(store.result_history().len(), 1);
        assert_eq!(store.config().exam_mode, ExamMode::Single);
        assert_eq!(ticks.running(), 0);
    }

    #[test]
    fn snapshot_round_trip_restores_config_and_history() {
        let (mut store, _) = started(
            3,
            ExamConfigDraft {
                timer_duration: Some(25),
                ..ExamConfigDraft::default()
            },
        );
        store.complete_exam();
        let snapshot = store.snapshot();

        let (mut fresh, _) = store_with(3);
        fresh.restore(snapshot.clone());
        assert_eq!(fresh.config().timer_duration, 25);
        assert_eq!(fresh.result_history(), snapshot.result_history.as_slice());
        assert!(!fresh.has_unsaved_changes());
        assert!(!fresh.is_started());

        fresh.clear_result_history();
        assert!(fresh.result_history().is_empty());
        assert!(fresh.has_unsaved_changes());
    }

    #[test]
    fn section_helpers_report_partial_last_section() {
        let (mut store, _) = started(15, ExamConfigDraft::default());
        store.select_answer(q(14), 0);
        store.toggle_deferred(q(15));

        let stats = store.section_stats(2);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.answered, 1);
        assert_eq!(stats.deferred, 1);
        assert_eq!(store.section_questions(2).first().map(|(i, _)| *i), Some(13));
        assert!(!store.is_last_section());

        store.go_to_question(14);
        assert!(store.is_last_section());

        let info = store.exam_info();
        assert_eq!(info.total_questions, 15);
        assert_eq!(info.total_sections, 2);
        assert_eq!(info.current_section, 2);
        assert_eq!(info.question_type, None);
    }
}
