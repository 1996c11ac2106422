use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use course_core::model::{
    ActivityId, AnswerOutcome, ContentBundle, LectureId, Progress, SectionKind,
};
use storage::ProgressStore;

use crate::config::CourseConfig;
use crate::content_store::ContentStore;
use crate::error::{ContentLoadError, CourseStartError, FragmentLoadError};
use crate::fetch::Fetcher;
use crate::flashcards::{FlashcardController, FlashcardView};
use crate::progress_tracker::{MarkOutcome, ProgressTracker};
use crate::quiz::{QuestionView, QuizController};
use crate::sections::{FragmentRequest, SectionRenderer};
use crate::summary::SummaryState;

/// A fragment fetch handed out by [`CourseSession::begin_open_section`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingFragment {
    Lecture(FragmentRequest<LectureId>),
    Activity(FragmentRequest<ActivityId>),
}

impl PendingFragment {
    #[must_use]
    pub fn locator(&self) -> &str {
        match self {
            Self::Lecture(request) => &request.locator,
            Self::Activity(request) => &request.locator,
        }
    }
}

/// Everything one learner sees on the course page.
///
/// Built once by [`CourseSession::start`]; each entry point runs to
/// completion on `&mut self`, so a mark, its write and the progress
/// recomputation are never observed half-done.
pub struct CourseSession {
    content: ContentStore,
    fetcher: Arc<dyn Fetcher>,
    tracker: ProgressTracker,
    lectures: SectionRenderer<LectureId>,
    activities: SectionRenderer<ActivityId>,
    flashcards: FlashcardController,
    quiz: QuizController,
    summary: SummaryState,
}

impl CourseSession {
    /// Load content, restore progress and render the initial views.
    ///
    /// Showing the first flashcard marks it visited. The summary is fetched
    /// here too; its failure stays inside [`SummaryState`].
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError` if the content document cannot be loaded;
    /// nothing else is initialised in that case.
    pub async fn start(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn ProgressStore>,
        config: &CourseConfig,
    ) -> Result<Self, ContentLoadError> {
        let content = ContentStore::load(fetcher.as_ref(), &config.document).await?;
        let mut tracker =
            ProgressTracker::restore(store, config.progress_key.clone(), content.shared()).await;

        let bundle = content.shared();
        let lectures = SectionRenderer::render(bundle.lectures(), &tracker);
        let activities = SectionRenderer::render(bundle.activities(), &tracker);

        let mut flashcards = FlashcardController::new();
        flashcards.show(0, &mut tracker).await;
        let mut quiz = QuizController::new();
        quiz.render(0, &tracker);

        let summary = SummaryState::load(bundle.summary(), fetcher.as_ref()).await;

        Ok(Self {
            content,
            fetcher,
            tracker,
            lectures,
            activities,
            flashcards,
            quiz,
            summary,
        })
    }

    /// Mark a lecture or activity read without opening it.
    pub async fn mark_item_read(&mut self, kind: SectionKind, id: u64) -> MarkOutcome {
        let outcome = match kind {
            SectionKind::Lecture => self.tracker.mark_lecture_read(LectureId::new(id)).await,
            SectionKind::Activity => self.tracker.mark_activity_read(ActivityId::new(id)).await,
        };
        match kind {
            SectionKind::Lecture => self.lectures.sync_status(&self.tracker),
            SectionKind::Activity => self.activities.sync_status(&self.tracker),
        }
        outcome
    }

    /// Expand a section and mark it read; returns the body fetch still to run.
    pub async fn begin_open_section(&mut self, kind: SectionKind, id: u64) -> Option<PendingFragment> {
        match kind {
            SectionKind::Lecture => self
                .lectures
                .open(LectureId::new(id), &mut self.tracker)
                .await
                .map(PendingFragment::Lecture),
            SectionKind::Activity => self
                .activities
                .open(ActivityId::new(id), &mut self.tracker)
                .await
                .map(PendingFragment::Activity),
        }
    }

    /// Store the result of a fetch started by [`CourseSession::begin_open_section`].
    pub fn finish_fragment(
        &mut self,
        pending: PendingFragment,
        result: Result<String, FragmentLoadError>,
    ) {
        match pending {
            PendingFragment::Lecture(request) => self.lectures.apply_fragment(request.id, result),
            PendingFragment::Activity(request) => {
                self.activities.apply_fragment(request.id, result);
            }
        }
    }

    /// Open a section and fetch its body in one step.
    pub async fn open_section(&mut self, kind: SectionKind, id: u64) {
        let Some(pending) = self.begin_open_section(kind, id).await else {
            return;
        };
        let result = self.fetcher.fetch(pending.locator()).await;
        self.finish_fragment(pending, result);
    }

    pub fn close_section(&mut self, kind: SectionKind, id: u64) {
        match kind {
            SectionKind::Lecture => self.lectures.close(LectureId::new(id)),
            SectionKind::Activity => self.activities.close(ActivityId::new(id)),
        }
    }

    /// Load every section body up front without marking anything read.
    pub async fn prefetch_fragments(&mut self) {
        let fetcher = Arc::clone(&self.fetcher);
        self.lectures.prefetch_all(fetcher.as_ref()).await;
        self.activities.prefetch_all(fetcher.as_ref()).await;
    }

    pub async fn advance_flashcard(&mut self, direction: i64) -> Option<FlashcardView> {
        self.flashcards.advance(direction, &mut self.tracker).await
    }

    pub fn flip_flashcard(&mut self) -> Option<FlashcardView> {
        self.flashcards.flip(&self.tracker)
    }

    pub async fn select_answer(&mut self, option: usize) -> AnswerOutcome {
        self.quiz.select(option, &mut self.tracker).await
    }

    pub fn advance_question(&mut self) -> Option<QuestionView> {
        self.quiz.advance(&self.tracker)
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.tracker.progress()
    }

    #[must_use]
    pub fn content(&self) -> &ContentBundle {
        self.content.bundle()
    }

    #[must_use]
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    #[must_use]
    pub fn lectures(&self) -> &SectionRenderer<LectureId> {
        &self.lectures
    }

    #[must_use]
    pub fn activities(&self) -> &SectionRenderer<ActivityId> {
        &self.activities
    }

    #[must_use]
    pub fn flashcard(&self) -> Option<FlashcardView> {
        self.flashcards.view(&self.tracker)
    }

    #[must_use]
    pub fn question(&self) -> Option<QuestionView> {
        self.quiz.view(&self.tracker)
    }

    #[must_use]
    pub fn summary(&self) -> &SummaryState {
        &self.summary
    }

    #[must_use]
    pub fn fetcher(&self) -> Arc<dyn Fetcher> {
        Arc::clone(&self.fetcher)
    }
}

/// Shared handle to a running session.
///
/// Handlers lock it for the duration of one entry point. Section bodies are
/// fetched with the lock released, so a slow fetch never blocks other input.
#[derive(Clone)]
pub struct Course {
    inner: Arc<Mutex<CourseSession>>,
}

impl Course {
    #[must_use]
    pub fn new(session: CourseSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Build the fetcher from `config`, then start a session.
    ///
    /// # Errors
    ///
    /// Returns `CourseStartError` if the fetcher cannot be built or the
    /// content cannot be loaded.
    pub async fn start(
        store: Arc<dyn ProgressStore>,
        config: &CourseConfig,
    ) -> Result<Self, CourseStartError> {
        let fetcher = config.build_fetcher()?;
        let session = CourseSession::start(fetcher, store, config).await?;
        Ok(Self::new(session))
    }

    /// Lock the session for one handler.
    pub async fn lock(&self) -> MutexGuard<'_, CourseSession> {
        self.inner.lock().await
    }

    pub async fn mark_item_read(&self, kind: SectionKind, id: u64) -> MarkOutcome {
        self.inner.lock().await.mark_item_read(kind, id).await
    }

    /// Open a section; the body is fetched without holding the lock.
    pub async fn open_section(&self, kind: SectionKind, id: u64) {
        let (pending, fetcher) = {
            let mut session = self.inner.lock().await;
            let pending = session.begin_open_section(kind, id).await;
            (pending, session.fetcher())
        };
        let Some(pending) = pending else {
            return;
        };
        let result = fetcher.fetch(pending.locator()).await;
        self.inner.lock().await.finish_fragment(pending, result);
    }

    pub async fn close_section(&self, kind: SectionKind, id: u64) {
        self.inner.lock().await.close_section(kind, id);
    }

    pub async fn advance_flashcard(&self, direction: i64) -> Option<FlashcardView> {
        self.inner.lock().await.advance_flashcard(direction).await
    }

    pub async fn flip_flashcard(&self) -> Option<FlashcardView> {
        self.inner.lock().await.flip_flashcard()
    }

    pub async fn select_answer(&self, option: usize) -> AnswerOutcome {
        self.inner.lock().await.select_answer(option).await
    }

    pub async fn advance_question(&self) -> Option<QuestionView> {
        self.inner.lock().await.advance_question()
    }

    pub async fn progress(&self) -> Progress {
        self.inner.lock().await.progress()
    }
}

impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use course_core::model::ItemRef;
    use storage::InMemoryProgressStore;

    use crate::config::ContentLocation;
    use crate::error::FetchError;
    use crate::sections::FragmentState;

    const DOCUMENT: &str = r#"{
        "lectures": [
            {"id": 1, "title": "Intro", "file": "l1.html"},
            {"id": 2, "title": "Rules", "file": "l2.html"}
        ],
        "activities": [{"id": 7, "title": "Drill", "file": "a7.html"}],
        "flashcards": [{"f": "SOLAS", "b": "Safety of life at sea"}, {"f": "MARPOL", "b": "Pollution"}],
        "quiz": [{"q": "Pick b", "o": ["a", "b"], "c": 1, "e": "It was b."}],
        "summary": ["Well done."]
    }"#;

    struct MapFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
            self.0
                .get(locator)
                .map(|body| (*body).to_string())
                .ok_or_else(|| FetchError::InvalidLocator(locator.to_string()))
        }
    }

    fn fetcher() -> Arc<dyn Fetcher> {
        Arc::new(MapFetcher(HashMap::from([
            ("data.json", DOCUMENT),
            ("l1.html", "<p>one</p>"),
            ("a7.html", "<p>drill</p>"),
        ])))
    }

    fn config() -> CourseConfig {
        CourseConfig::new(ContentLocation::Directory(".".into()))
    }

    async fn session(store: InMemoryProgressStore) -> CourseSession {
        CourseSession::start(fetcher(), Arc::new(store), &config())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn start_shows_first_flashcard_and_question() {
        let session = session(InMemoryProgressStore::new()).await;

        let progress = session.progress();
        assert_eq!((progress.current, progress.total), (1, 6));
        assert!(session.tracker().is_done(ItemRef::Flashcard(0)));
        assert_eq!(session.flashcard().unwrap().position, "1 / 2");
        assert_eq!(session.question().unwrap().prompt, "Pick b");
        assert_eq!(session.summary(), &SummaryState::Inline(vec!["Well done.".into()]));
    }

    #[tokio::test]
    async fn missing_document_initialises_nothing() {
        let store = InMemoryProgressStore::new();
        let empty: Arc<dyn Fetcher> = Arc::new(MapFetcher(HashMap::new()));
        let result = CourseSession::start(empty, Arc::new(store.clone()), &config()).await;
        assert!(matches!(result, Err(ContentLoadError::Fetch(_))));
        assert_eq!(store.get("course-progress").await.unwrap(), None);
    }

    #[tokio::test]
    async fn open_section_marks_and_loads_body() {
        let mut session = session(InMemoryProgressStore::new()).await;
        session.open_section(SectionKind::Lecture, 1).await;

        let section = session.lectures().section(LectureId::new(1)).unwrap();
        assert!(section.is_open());
        assert_eq!(section.fragment(), &FragmentState::Loaded("<p>one</p>".into()));
        assert_eq!(session.progress().current, 2);

        session.open_section(SectionKind::Lecture, 2).await;
        assert!(matches!(
            session.lectures().section(LectureId::new(2)).unwrap().fragment(),
            FragmentState::Failed(_)
        ));
        assert!(!session.lectures().section(LectureId::new(1)).unwrap().is_open());
        assert_eq!(session.progress().current, 3);
    }

    #[tokio::test]
    async fn mark_item_read_updates_section_status() {
        let mut session = session(InMemoryProgressStore::new()).await;
        let outcome = session.mark_item_read(SectionKind::Activity, 7).await;
        assert!(outcome.newly_marked);
        assert_eq!(
            session.activities().section(ActivityId::new(7)).unwrap().status(),
            crate::sections::SectionStatus::Completed
        );
        let again = session.mark_item_read(SectionKind::Activity, 7).await;
        assert!(!again.newly_marked);
    }

    #[tokio::test]
    async fn completing_everything_reaches_hundred() {
        let store = InMemoryProgressStore::new();
        let course = Course::new(session(store.clone()).await);

        course.open_section(SectionKind::Lecture, 1).await;
        course.open_section(SectionKind::Lecture, 2).await;
        course.open_section(SectionKind::Activity, 7).await;
        course.advance_flashcard(1).await;
        assert_eq!(course.select_answer(0).await, AnswerOutcome::Incorrect);
        assert_eq!(course.select_answer(1).await, AnswerOutcome::Correct);

        let progress = course.progress().await;
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());

        let stored = store.get("course-progress").await.unwrap().unwrap();
        assert_eq!(
            stored,
            r#"{"readLectures":[1,2],"readActivities":[7],"doneFC":[0,1],"doneQ":[0]}"#
        );
    }

    #[tokio::test]
    async fn prefetch_does_not_mark() {
        let mut session = session(InMemoryProgressStore::new()).await;
        session.prefetch_fragments().await;
        assert_eq!(session.progress().current, 1);
        assert_eq!(
            session.activities().section(ActivityId::new(7)).unwrap().fragment(),
            &FragmentState::Loaded("<p>drill</p>".into())
        );
    }
}
