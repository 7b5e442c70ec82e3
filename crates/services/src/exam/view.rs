use exam_core::model::{ExamMode, QuestionType, RcQuestionOrder};

/// The screen a presentation layer should show. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamView {
    NotStarted,
    Question,
    /// Overall review list, filtered by the store's review filter.
    Review,
    /// Checkpoint between two sections in sectioned mode.
    SectionReview,
    Results,
}

/// Summary of the running exam for headers and status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamInfo {
    /// `None` when all question types are included.
    pub question_type: Option<QuestionType>,
    pub exam_mode: ExamMode,
    pub total_questions: usize,
    pub current_section: u32,
    pub total_sections: u32,
    pub rc_question_order: RcQuestionOrder,
}
