//! The `exam settings` command.

use anyhow::Result;
use exam_core::model::{DEFAULT_TIMER_MINUTES, ExamPreferences};
use services::ExamServices;

use crate::render;
use crate::{SettingsAction, SettingsSetArgs};

pub async fn execute(db_url: &str, action: SettingsAction) -> Result<()> {
    let services = ExamServices::new_sqlite(db_url).await?;
    let preferences = services.preferences();
    let current = preferences.load().await?;

    match action {
        SettingsAction::Show => print!("{}", render::preferences(&current)),
        SettingsAction::Set(args) => {
            let updated = merge(current, &args);
            preferences.save(&updated).await?;
            println!("Preferences saved.");
            print!("{}", render::preferences(&updated));
        }
    }
    Ok(())
}

fn merge(mut prefs: ExamPreferences, args: &SettingsSetArgs) -> ExamPreferences {
    if let Some(mode) = args.mode {
        prefs.exam_mode = mode;
    }
    if let Some(timer) = args.timer {
        prefs.timer_mode = timer;
    }
    if let Some(minutes) = args.minutes {
        prefs.selected_timer_duration = if minutes == 0 {
            DEFAULT_TIMER_MINUTES
        } else {
            minutes
        };
    }
    if let Some(filter) = args.type_filter {
        prefs.question_type_filter = filter;
    }
    if let Some(kind) = args.question_type {
        prefs.selected_question_type = kind;
    }
    if let Some(order) = args.rc_order {
        prefs.rc_question_order = order;
    }
    prefs
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{QuestionType, QuestionTypeFilter, TimerMode};

    #[test]
    fn merge_only_touches_given_fields() {
        let args = SettingsSetArgs {
            timer: Some(TimerMode::Total),
            type_filter: Some(QuestionTypeFilter::Specific),
            question_type: Some(QuestionType::Completion),
            ..SettingsSetArgs::default()
        };
        let merged = merge(ExamPreferences::default(), &args);

        assert_eq!(merged.timer_mode, TimerMode::Total);
        assert_eq!(merged.selected_question_type, QuestionType::Completion);
        assert_eq!(merged.exam_mode, ExamPreferences::default().exam_mode);
        assert_eq!(merged.to_draft().normalize().type_filter(), Some(QuestionType::Completion));
    }

    #[test]
    fn zero_minutes_restores_default() {
        let args = SettingsSetArgs {
            minutes: Some(0),
            ..SettingsSetArgs::default()
        };
        assert_eq!(
            merge(ExamPreferences::default(), &args).selected_timer_duration,
            DEFAULT_TIMER_MINUTES
        );
    }
}
