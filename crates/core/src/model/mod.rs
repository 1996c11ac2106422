pub mod content;
mod ids;
pub mod progress;
pub mod quiz;

pub use content::{
    Activity, ContentBundle, ContentDocument, ContentItem, ContentValidationError, Flashcard,
    Lecture, QuizQuestion, SectionItemId, SummarySource,
};
pub use ids::{ActivityId, LectureId, ParseIdError};
pub use progress::{
    ItemRef, ParseSectionKindError, PersistedProgress, Progress, ProgressState, SectionKind,
};
pub use quiz::{AnswerOutcome, QuestionState};
