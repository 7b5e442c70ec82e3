use exam_core::model::{
    AnswerMap, DeferMap, ExamMode, ExamPreferences, ExamResults, ExamSnapshot, Question,
    QuestionNumber, QuestionRecord, QuestionType, RcQuestionOrder, TimerMode,
};
use exam_core::time::fixed_now;
use storage::repository::{PreferencesRepository, SnapshotRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn finished_exam() -> ExamResults {
    let questions: Vec<Question> = (0..3)
        .map(|i| {
            Question::issue(
                QuestionRecord {
                    id: Some(format!("bank-{i}")),
                    question_number: 10 + i,
                    question_type: QuestionType::Error,
                    question: format!("Sentence {i}"),
                    choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    passage: None,
                    answer: 2,
                },
                usize::try_from(i).unwrap(),
            )
            .unwrap()
        })
        .collect();
    let mut answers = AnswerMap::new();
    answers.insert(QuestionNumber::new(1), 2);
    answers.insert(QuestionNumber::new(2), 0);
    ExamResults::score(&questions, &answers, &DeferMap::new(), fixed_now())
}

#[tokio::test]
async fn sqlite_round_trips_preferences() {
    let repo = connect("memdb_prefs").await;
    assert!(repo.get_preferences().await.unwrap().is_none());

    let prefs = ExamPreferences {
        exam_mode: ExamMode::Single,
        timer_mode: TimerMode::Total,
        selected_timer_duration: 45,
        rc_question_order: RcQuestionOrder::Random,
        ..ExamPreferences::default()
    };
    repo.save_preferences(&prefs).await.unwrap();
    assert_eq!(repo.get_preferences().await.unwrap(), Some(prefs.clone()));

    let updated = ExamPreferences {
        selected_timer_duration: 60,
        ..prefs
    };
    repo.save_preferences(&updated).await.unwrap();
    assert_eq!(repo.get_preferences().await.unwrap(), Some(updated));
}

#[tokio::test]
async fn sqlite_round_trips_snapshot_with_history() {
    let repo = connect("memdb_snapshot").await;

    let mut snapshot = ExamSnapshot::default();
    snapshot.config.timer_mode = TimerMode::Total;
    snapshot.config.timer_duration = 20;
    snapshot.result_history.push(finished_exam());
    repo.save_snapshot(&snapshot).await.unwrap();

    let fetched = repo.get_snapshot().await.unwrap().expect("snapshot stored");
    assert_eq!(fetched, snapshot);
    assert_eq!(fetched.result_history[0].correct_answers(), 1);
    assert_eq!(fetched.result_history[0].incorrect_answers(), 1);
}

#[tokio::test]
async fn sqlite_reports_corrupt_blob() {
    let repo = connect("memdb_corrupt").await;
    sqlx::query("INSERT INTO kv_blobs (key, value, updated_at) VALUES (?1, ?2, ?3)")
        .bind(storage::SETTINGS_KEY)
        .bind("{\"examMode\": 42")
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.get_preferences().await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    repo.save_snapshot(&ExamSnapshot::default()).await.unwrap();
    assert!(repo.get_snapshot().await.unwrap().is_some());
}
