use std::sync::Arc;

use course_core::model::{ActivityId, LectureId, SectionKind};
use services::{Course, CourseSession, Fetcher, PendingFragment};

use super::flashcard_vm::{FlashcardVm, map_flashcard};
use super::progress_vm::{ProgressVm, map_progress};
use super::quiz_vm::{QuizVm, map_question};
use super::section_vm::{SectionVm, map_sections};
use super::summary_vm::{SummaryVm, map_summary};

/// User actions on the course page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseIntent {
    ToggleSection { kind: SectionKind, id: u64 },
    MarkRead { kind: SectionKind, id: u64 },
    PreviousFlashcard,
    NextFlashcard,
    FlipFlashcard,
    SelectAnswer(usize),
    NextQuestion,
}

/// Everything the course page renders, snapshotted from the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseVm {
    pub progress: ProgressVm,
    pub lectures: Vec<SectionVm>,
    pub activities: Vec<SectionVm>,
    pub flashcard: Option<FlashcardVm>,
    pub quiz: Option<QuizVm>,
    pub summary: SummaryVm,
}

#[must_use]
pub fn map_course(session: &CourseSession) -> CourseVm {
    CourseVm {
        progress: map_progress(session.progress()),
        lectures: map_sections(session.lectures()),
        activities: map_sections(session.activities()),
        flashcard: session.flashcard().as_ref().map(map_flashcard),
        quiz: session.question().as_ref().map(map_question),
        summary: map_summary(session.summary()),
    }
}

/// Result of applying an intent under the session lock.
pub enum IntentStep {
    Done(CourseVm),
    /// A section was opened; its body still has to be fetched.
    Fetch {
        vm: CourseVm,
        pending: PendingFragment,
        fetcher: Arc<dyn Fetcher>,
    },
}

impl IntentStep {
    #[must_use]
    pub fn vm(&self) -> &CourseVm {
        match self {
            Self::Done(vm) | Self::Fetch { vm, .. } => vm,
        }
    }
}

/// Apply `intent` as one locked unit and snapshot the result.
pub async fn begin_intent(course: &Course, intent: CourseIntent) -> IntentStep {
    let mut session = course.lock().await;
    match intent {
        CourseIntent::ToggleSection { kind, id } => {
            if section_is_open(&session, kind, id) {
                session.close_section(kind, id);
            } else if let Some(pending) = session.begin_open_section(kind, id).await {
                return IntentStep::Fetch {
                    vm: map_course(&session),
                    pending,
                    fetcher: session.fetcher(),
                };
            }
        }
        CourseIntent::MarkRead { kind, id } => {
            session.mark_item_read(kind, id).await;
        }
        CourseIntent::PreviousFlashcard => {
            session.advance_flashcard(-1).await;
        }
        CourseIntent::NextFlashcard => {
            session.advance_flashcard(1).await;
        }
        CourseIntent::FlipFlashcard => {
            session.flip_flashcard();
        }
        CourseIntent::SelectAnswer(option) => {
            session.select_answer(option).await;
        }
        CourseIntent::NextQuestion => {
            session.advance_question();
        }
    }
    IntentStep::Done(map_course(&session))
}

/// Fetch a section body without the lock held, then store it.
pub async fn finish_open(
    course: &Course,
    pending: PendingFragment,
    fetcher: Arc<dyn Fetcher>,
) -> CourseVm {
    let result = fetcher.fetch(pending.locator()).await;
    let mut session = course.lock().await;
    session.finish_fragment(pending, result);
    map_course(&session)
}

fn section_is_open(session: &CourseSession, kind: SectionKind, id: u64) -> bool {
    match kind {
        SectionKind::Lecture => session
            .lectures()
            .section(LectureId::new(id))
            .is_some_and(|section| section.is_open()),
        SectionKind::Activity => session
            .activities()
            .section(ActivityId::new(id))
            .is_some_and(|section| section.is_open()),
    }
}
