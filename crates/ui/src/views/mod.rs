mod components;
mod course;
mod state;

#[cfg(test)]
mod view_smoke;

pub use components::{Accordion, FlashcardPanel, ProgressHeader, QuizPanel, SummaryPanel};
pub use course::{CoursePage, CourseView};
pub use state::{ViewError, ViewState, view_state_from_resource};
