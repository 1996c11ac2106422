use futures::future::join_all;

use course_core::model::{ContentItem, SectionItemId};

use crate::error::FragmentLoadError;
use crate::fetch::Fetcher;
use crate::progress_tracker::ProgressTracker;

/// Status indicator shown on a section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    Pending,
    Completed,
}

/// Load state of a section body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FragmentState {
    #[default]
    NotRequested,
    Loading,
    Loaded(String),
    Failed(String),
}

/// One collapsible lecture or activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<I> {
    id: I,
    title: String,
    content_ref: String,
    status: SectionStatus,
    open: bool,
    fragment: FragmentState,
}

impl<I: SectionItemId> Section<I> {
    #[must_use]
    pub fn id(&self) -> I {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content_ref(&self) -> &str {
        &self.content_ref
    }

    #[must_use]
    pub fn status(&self) -> SectionStatus {
        self.status
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn fragment(&self) -> &FragmentState {
        &self.fragment
    }
}

/// A body that still has to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRequest<I> {
    pub id: I,
    pub locator: String,
}

/// Accordion for one content kind, rendered from the items and the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRenderer<I> {
    sections: Vec<Section<I>>,
}

impl<I: SectionItemId> SectionRenderer<I> {
    /// Build one closed section per item, with status taken from the tracker.
    #[must_use]
    pub fn render(items: &[ContentItem<I>], tracker: &ProgressTracker) -> Self {
        let sections = items
            .iter()
            .map(|item| Section {
                id: item.id(),
                title: item.title().to_string(),
                content_ref: item.content_ref().to_string(),
                status: status_for(tracker, item.id()),
                open: false,
                fragment: FragmentState::NotRequested,
            })
            .collect();
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[Section<I>] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, id: I) -> Option<&Section<I>> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Expand `id`, collapsing its siblings.
    ///
    /// The first open marks the item complete (if it is not already) and
    /// returns the fragment request; later opens return `None` and touch
    /// neither the tracker nor the fetch state.
    pub async fn open(&mut self, id: I, tracker: &mut ProgressTracker) -> Option<FragmentRequest<I>> {
        let position = self.sections.iter().position(|section| section.id == id)?;
        for (index, section) in self.sections.iter_mut().enumerate() {
            section.open = index == position;
        }

        let section = &mut self.sections[position];
        if section.status == SectionStatus::Pending {
            tracker.mark(id.item_ref()).await;
            section.status = status_for(tracker, id);
        }

        if section.fragment != FragmentState::NotRequested {
            return None;
        }
        section.fragment = FragmentState::Loading;
        Some(FragmentRequest {
            id,
            locator: section.content_ref.clone(),
        })
    }

    /// Collapse `id` without changing completion.
    pub fn close(&mut self, id: I) {
        if let Some(section) = self.sections.iter_mut().find(|section| section.id == id) {
            section.open = false;
        }
    }

    /// Move every not-yet-requested body to `Loading` and return the requests.
    ///
    /// Nothing is marked complete.
    pub fn request_all(&mut self) -> Vec<FragmentRequest<I>> {
        self.sections
            .iter_mut()
            .filter(|section| section.fragment == FragmentState::NotRequested)
            .map(|section| {
                section.fragment = FragmentState::Loading;
                FragmentRequest {
                    id: section.id,
                    locator: section.content_ref.clone(),
                }
            })
            .collect()
    }

    /// Fetch every body not yet requested, concurrently, and store the results.
    /// Completion is not touched.
    pub async fn prefetch_all(&mut self, fetcher: &dyn Fetcher) {
        let requests = self.request_all();
        if requests.is_empty() {
            return;
        }
        tracing::debug!(kind = %I::KIND, count = requests.len(), "prefetching fragments");
        for (id, result) in fetch_fragments(fetcher, requests).await {
            self.apply_fragment(id, result);
        }
    }

    /// Store the outcome of one fetch. Other sections are left untouched.
    pub fn apply_fragment(&mut self, id: I, result: Result<String, FragmentLoadError>) {
        let Some(section) = self.sections.iter_mut().find(|section| section.id == id) else {
            return;
        };
        section.fragment = match result {
            Ok(html) => {
                tracing::debug!(kind = %I::KIND, %id, "fragment loaded");
                FragmentState::Loaded(html)
            }
            Err(err) => {
                tracing::warn!(kind = %I::KIND, %id, error = %err, "fragment failed to load");
                FragmentState::Failed(err.to_string())
            }
        };
    }

    /// Refresh status indicators from the tracker.
    pub fn sync_status(&mut self, tracker: &ProgressTracker) {
        for section in &mut self.sections {
            section.status = status_for(tracker, section.id);
        }
    }
}

fn status_for<I: SectionItemId>(tracker: &ProgressTracker, id: I) -> SectionStatus {
    if tracker.is_done(id.item_ref()) {
        SectionStatus::Completed
    } else {
        SectionStatus::Pending
    }
}

/// Fetch every request concurrently; results come back paired with their ids.
pub async fn fetch_fragments<I: SectionItemId>(
    fetcher: &dyn Fetcher,
    requests: Vec<FragmentRequest<I>>,
) -> Vec<(I, Result<String, FragmentLoadError>)> {
    join_all(requests.into_iter().map(|request| async move {
        let result = fetcher.fetch(&request.locator).await;
        (request.id, result)
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use course_core::model::{ContentBundle, Lecture, LectureId, SummarySource};
    use storage::InMemoryProgressStore;

    use crate::error::FetchError;

    struct ScriptedFetcher {
        delays: HashMap<&'static str, u64>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(locator.to_string());
            let delay = self.delays.get(locator).copied().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if locator.contains("broken") {
                return Err(FetchError::InvalidLocator(locator.to_string()));
            }
            Ok(format!("<p>{locator}</p>"))
        }
    }

    fn lectures() -> Vec<Lecture> {
        vec![
            Lecture::new(LectureId::new(1), "X", "broken.html"),
            Lecture::new(LectureId::new(2), "Y", "y.html"),
            Lecture::new(LectureId::new(3), "Z", "z.html"),
        ]
    }

    async fn tracker(persisted: Option<&str>) -> ProgressTracker {
        let store = match persisted {
            Some(raw) => InMemoryProgressStore::with_value("k", raw),
            None => InMemoryProgressStore::new(),
        };
        let content =
            ContentBundle::new(lectures(), Vec::new(), Vec::new(), Vec::new(), SummarySource::None)
                .unwrap();
        ProgressTracker::restore(Arc::new(store), "k", Arc::new(content)).await
    }

    #[tokio::test]
    async fn initial_status_follows_restored_sets() {
        let tracker = tracker(Some(r#"{"readLectures":[2]}"#)).await;
        let renderer = SectionRenderer::render(&lectures(), &tracker);
        let statuses: Vec<_> = renderer.sections().iter().map(Section::status).collect();
        assert_eq!(
            statuses,
            vec![SectionStatus::Pending, SectionStatus::Completed, SectionStatus::Pending]
        );
    }

    #[tokio::test]
    async fn first_open_marks_and_requests_once() {
        let mut tracker = tracker(None).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);

        let request = renderer.open(LectureId::new(2), &mut tracker).await;
        assert_eq!(
            request,
            Some(FragmentRequest {
                id: LectureId::new(2),
                locator: "y.html".to_string(),
            })
        );
        assert_eq!(tracker.progress().current, 1);
        let section = renderer.section(LectureId::new(2)).unwrap();
        assert_eq!(section.status(), SectionStatus::Completed);
        assert_eq!(section.fragment(), &FragmentState::Loading);

        assert_eq!(renderer.open(LectureId::new(2), &mut tracker).await, None);
        assert_eq!(tracker.progress().current, 1);
    }

    #[tokio::test]
    async fn opening_collapses_siblings() {
        let mut tracker = tracker(None).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);
        renderer.open(LectureId::new(1), &mut tracker).await;
        renderer.open(LectureId::new(3), &mut tracker).await;

        let open: Vec<_> = renderer
            .sections()
            .iter()
            .filter(|s| s.is_open())
            .map(Section::id)
            .collect();
        assert_eq!(open, vec![LectureId::new(3)]);

        renderer.close(LectureId::new(3));
        assert!(renderer.sections().iter().all(|s| !s.is_open()));
        assert_eq!(tracker.progress().current, 2);
    }

    #[tokio::test]
    async fn restored_section_fetches_without_remarking() {
        let mut tracker = tracker(Some(r#"{"readLectures":[3]}"#)).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);
        let request = renderer.open(LectureId::new(3), &mut tracker).await;
        assert!(request.is_some());
        assert_eq!(tracker.progress().current, 1);
    }

    #[tokio::test]
    async fn unknown_section_is_a_no_op() {
        let mut tracker = tracker(None).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);
        assert_eq!(renderer.open(LectureId::new(99), &mut tracker).await, None);
        assert_eq!(tracker.progress().current, 0);
    }

    #[tokio::test]
    async fn one_failure_leaves_siblings_loaded() {
        let tracker = tracker(None).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);
        let fetcher = ScriptedFetcher {
            delays: HashMap::from([("broken.html", 5), ("y.html", 30), ("z.html", 1)]),
            calls: Mutex::new(Vec::new()),
        };

        let requests = renderer.request_all();
        assert_eq!(requests.len(), 3);
        assert!(renderer.request_all().is_empty());

        for (id, result) in fetch_fragments(&fetcher, requests).await {
            renderer.apply_fragment(id, result);
        }

        assert!(matches!(
            renderer.section(LectureId::new(1)).unwrap().fragment(),
            FragmentState::Failed(_)
        ));
        assert_eq!(
            renderer.section(LectureId::new(2)).unwrap().fragment(),
            &FragmentState::Loaded("<p>y.html</p>".to_string())
        );
        assert_eq!(
            renderer.section(LectureId::new(3)).unwrap().fragment(),
            &FragmentState::Loaded("<p>z.html</p>".to_string())
        );
        assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
        assert_eq!(tracker.progress().current, 0);
    }

    #[tokio::test]
    async fn prefetch_loads_bodies_without_marking() {
        let tracker = tracker(None).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);
        let fetcher = ScriptedFetcher {
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        };

        renderer.prefetch_all(&fetcher).await;
        renderer.prefetch_all(&fetcher).await;

        assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
        assert!(renderer
            .sections()
            .iter()
            .all(|s| s.status() == SectionStatus::Pending && !s.is_open()));
        assert_eq!(
            renderer.section(LectureId::new(3)).unwrap().fragment(),
            &FragmentState::Loaded("<p>z.html</p>".to_string())
        );
    }

    #[tokio::test]
    async fn sync_status_picks_up_external_marks() {
        let mut tracker = tracker(None).await;
        let mut renderer = SectionRenderer::render(&lectures(), &tracker);
        tracker.mark_lecture_read(LectureId::new(1)).await;
        assert_eq!(
            renderer.section(LectureId::new(1)).unwrap().status(),
            SectionStatus::Pending
        );
        renderer.sync_status(&tracker);
        assert_eq!(
            renderer.section(LectureId::new(1)).unwrap().status(),
            SectionStatus::Completed
        );
    }
}
