//! Plain-text screens for the exam views.

use std::fmt::Write as _;

use exam_core::model::{ExamPreferences, ExamResults};
use exam_core::time::format_countdown;
use services::{ExamStore, ExamView};

/// Render whichever view the store is in.
pub fn screen(store: &ExamStore) -> String {
    match store.view() {
        ExamView::NotStarted => "No exam in progress.\n".to_owned(),
        ExamView::Question => question(store),
        ExamView::Review => review_list(store),
        ExamView::SectionReview => section_review(store),
        ExamView::Results => store.results().map_or_else(String::new, results),
    }
}

pub fn status_line(store: &ExamStore) -> String {
    let info = store.exam_info();
    let stats = store.question_stats();
    let mut line = format!(
        "[{} | section {}/{} | answered {}/{} | deferred {}",
        info.question_type.map_or("all types", |t| t.label()),
        info.current_section,
        info.total_sections,
        stats.answered,
        stats.total,
        stats.deferred,
    );
    if store.timer_active() {
        let _ = write!(line, " | {} left", format_countdown(store.time_remaining()));
    }
    line.push(']');
    line
}

fn question(store: &ExamStore) -> String {
    let Some(q) = store.current_question() else {
        return String::new();
    };
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(store));
    let _ = writeln!(
        out,
        "Question {} of {} ({})",
        q.number(),
        store.questions().len(),
        q.question_type().label()
    );
    if let Some(passage) = q.passage() {
        let _ = writeln!(out, "\n{passage}\n");
    }
    let _ = writeln!(out, "{}", q.text());

    let chosen = store.answer_for(q.number());
    for (i, choice) in q.choices().iter().enumerate() {
        let mark = if chosen == Some(i) { '*' } else { ' ' };
        let _ = writeln!(out, " {mark} {}. {choice}", i + 1);
    }
    if store.is_deferred(q.number()) {
        out.push_str("(deferred)\n");
    }
    out.push_str(next_hint(store));
    out
}

fn next_hint(store: &ExamStore) -> &'static str {
    if store.is_last_question() && store.first_deferred_index().is_some() {
        "n: go to first deferred question\n"
    } else if store.is_last_question() {
        "n: finish exam\n"
    } else {
        ""
    }
}

fn section_review(store: &ExamStore) -> String {
    let section = store.current_section();
    let stats = store.section_stats(section);
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(store));
    let _ = writeln!(
        out,
        "Section {section} of {} complete: {}/{} answered, {} deferred ({}%)",
        store.total_sections(),
        stats.answered,
        stats.total,
        stats.deferred,
        stats.completion(),
    );
    for (_, q) in store.section_questions(section) {
        let state = if store.is_deferred(q.number()) {
            "deferred"
        } else if store.answer_for(q.number()).is_some() {
            "answered"
        } else {
            "open"
        };
        let _ = writeln!(out, "  {:>3}  {state}", q.number().value());
    }
    if store.is_last_section() {
        out.push_str("c: finish exam | b: back to section start | g N: open question N\n");
    } else {
        let _ = writeln!(
            out,
            "c: continue to section {} | b: back to section start | g N: open question N",
            section + 1
        );
    }
    out
}

fn review_list(store: &ExamStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(store));
    let _ = writeln!(out, "Review ({})", store.review_filter());
    let rows = store.review_questions();
    if rows.is_empty() {
        out.push_str("  nothing matches this filter\n");
    }
    for (_, q) in rows {
        let answer = store
            .answer_for(q.number())
            .map_or_else(|| "-".to_owned(), |a| (a + 1).to_string());
        let flag = if store.is_deferred(q.number()) { " D" } else { "" };
        let _ = writeln!(out, "  {:>3}  answer {answer}{flag}", q.number().value());
    }
    out.push_str("g N: open question N | f FILTER: all/answered/unanswered/deferred | x: close\n");
    out
}

pub fn results(results: &ExamResults) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Score: {}/{} ({}% of answered)",
        results.correct_answers(),
        results.total_questions(),
        results.percentage()
    );
    let _ = writeln!(
        out,
        "Correct {} | Incorrect {} | Unanswered {}",
        results.correct_answers(),
        results.incorrect_answers(),
        results.unanswered_questions()
    );
    for detail in results.detailed_results() {
        let verdict = if detail.is_correct {
            "correct"
        } else if detail.is_answered {
            "wrong"
        } else {
            "unanswered"
        };
        let yours = detail
            .user_answer
            .map_or_else(|| "-".to_owned(), |a| (a + 1).to_string());
        let _ = writeln!(
            out,
            "  {:>3}  {:<10} yours {yours}  key {}",
            detail.question_number.value(),
            verdict,
            detail.correct_answer + 1
        );
    }
    out
}

pub fn preferences(prefs: &ExamPreferences) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "exam mode:        {}", prefs.exam_mode);
    let _ = writeln!(out, "timer:            {}", prefs.timer_mode);
    let _ = writeln!(out, "timer minutes:    {}", prefs.selected_timer_duration);
    let _ = writeln!(out, "question types:   {}", prefs.question_type_filter);
    let _ = writeln!(out, "selected type:    {}", prefs.selected_question_type);
    let _ = writeln!(out, "rc order:         {}", prefs.rc_question_order);
    out
}

pub fn history(results: &[ExamResults]) -> String {
    if results.is_empty() {
        return "No completed exams.\n".to_owned();
    }
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}  {}/{} correct ({}% of answered), {} unanswered",
            i + 1,
            r.completed_at().format("%Y-%m-%d %H:%M"),
            r.correct_answers(),
            r.total_questions(),
            r.percentage(),
            r.unanswered_questions()
        );
    }
    out
}
