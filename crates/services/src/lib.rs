#![forbid(unsafe_code)]

pub mod config;
pub mod content_store;
pub mod course;
pub mod error;
pub mod fetch;
pub mod flashcards;
pub mod progress_tracker;
pub mod quiz;
pub mod sections;
pub mod summary;

pub use config::{ContentLocation, CourseConfig};
pub use content_store::ContentStore;
pub use course::{Course, CourseSession, PendingFragment};
pub use error::{
    ConfigError, ContentLoadError, CourseStartError, FetchError, FragmentLoadError,
    PersistedStateParseError,
};
pub use fetch::{DirectoryFetcher, Fetcher, HttpFetcher};
pub use flashcards::{FlashcardController, FlashcardView};
pub use progress_tracker::{MarkOutcome, ProgressTracker};
pub use quiz::{Feedback, OptionMark, OptionView, QuestionView, QuizController};
pub use sections::{
    FragmentRequest, FragmentState, Section, SectionRenderer, SectionStatus, fetch_fragments,
};
pub use summary::SummaryState;
