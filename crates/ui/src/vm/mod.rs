mod course_vm;
mod flashcard_vm;
mod html;
mod progress_vm;
mod quiz_vm;
mod section_vm;
mod summary_vm;

pub use course_vm::{CourseIntent, CourseVm, IntentStep, begin_intent, finish_open, map_course};
pub use flashcard_vm::{FlashcardVm, map_flashcard};
pub use html::{markdown_to_html, sanitize_html};
pub use progress_vm::{ProgressVm, map_progress};
pub use quiz_vm::{INCORRECT_FEEDBACK, QuizOptionVm, QuizVm, map_question};
pub use section_vm::{SectionBodyVm, SectionVm, map_sections};
pub use summary_vm::{SummaryVm, map_summary};
