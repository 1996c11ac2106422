use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use course_core::model::{Progress, SectionKind};
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use services::{ContentLocation, CourseConfig, FetchError, Fetcher};
use storage::{InMemoryProgressStore, ProgressStore};

use crate::context::{UiApp, build_app_context};
use crate::views::{Accordion, CourseView, ProgressHeader, QuizPanel, SummaryPanel};
use crate::vm::{QuizOptionVm, QuizVm, SectionBodyVm, SectionVm, SummaryVm, map_progress};

fn render(app: fn() -> Element) -> String {
    let mut dom = VirtualDom::new(app);
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}

#[test]
fn progress_header_renders_badge_and_label() {
    let html = render(|| {
        rsx! {
            ProgressHeader {
                progress: map_progress(Progress { current: 3, total: 9, percent: 33 }),
            }
        }
    });
    assert!(html.contains("3 / 9 milestones completed"), "{html}");
    assert!(html.contains("width: 33%"), "{html}");
    assert!(!html.contains("bg-success"), "{html}");

    let html = render(|| {
        rsx! {
            ProgressHeader {
                progress: map_progress(Progress { current: 4, total: 4, percent: 100 }),
            }
        }
    });
    assert!(html.contains("badge bg-success"), "{html}");
}

fn section(id: u64, open: bool, body: SectionBodyVm) -> SectionVm {
    SectionVm {
        kind: SectionKind::Lecture,
        id,
        title: format!("Lecture {id}"),
        completed: open,
        open,
        body,
        dom_id: format!("lecture-{id}"),
    }
}

#[test]
fn accordion_renders_failure_inline_only_for_that_item() {
    let html = render(|| {
        rsx! {
            Accordion {
                sections: vec![
                    section(1, true, SectionBodyVm::Error),
                    section(2, false, SectionBodyVm::Empty),
                ],
                on_intent: move |_| {},
            }
        }
    });
    assert!(html.contains("Could not load this content."), "{html}");
    assert!(html.contains("status-completed"), "{html}");
    assert!(html.contains("status-pending"), "{html}");
    assert_eq!(html.matches("accordion-body").count(), 1, "{html}");
    assert!(html.contains("Mark as read"), "{html}");
}

#[test]
fn quiz_panel_shows_explanation_and_next() {
    let html = render(|| {
        rsx! {
            QuizPanel {
                quiz: QuizVm {
                    prompt: "Which convention covers pollution?".into(),
                    counter: "1 / 3".into(),
                    options: vec![
                        QuizOptionVm { index: 0, text: "SOLAS".into(), class: "quiz-option", disabled: true },
                        QuizOptionVm { index: 1, text: "MARPOL".into(), class: "quiz-option correct", disabled: true },
                    ],
                    feedback: Some("MARPOL covers pollution from ships.".into()),
                    feedback_class: "explanation-box",
                    next_visible: true,
                },
                on_intent: move |_| {},
            }
        }
    });
    assert!(html.contains("quiz-option correct"), "{html}");
    assert!(html.contains("MARPOL covers pollution from ships."), "{html}");
    assert!(html.contains("Next question"), "{html}");
    assert!(html.contains("1 / 3"), "{html}");
}

#[test]
fn hidden_summary_renders_nothing() {
    let html = render(|| rsx! { SummaryPanel { summary: SummaryVm::Hidden } });
    assert!(!html.contains("Summary"), "{html}");
}

struct TestFetcher {
    document: Option<&'static str>,
}

#[async_trait]
impl Fetcher for TestFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        match (locator, self.document) {
            ("data.json", Some(document)) => Ok(document.to_string()),
            _ => Err(FetchError::InvalidLocator(locator.to_string())),
        }
    }
}

struct TestApp {
    fetcher: Arc<TestFetcher>,
    store: InMemoryProgressStore,
}

impl UiApp for TestApp {
    fn course_config(&self) -> CourseConfig {
        CourseConfig::new(ContentLocation::Directory(".".into()))
    }

    fn fetcher(&self) -> Arc<dyn Fetcher> {
        self.fetcher.clone()
    }

    fn progress_store(&self) -> Arc<dyn ProgressStore> {
        Arc::new(self.store.clone())
    }
}

#[derive(Props, Clone)]
struct HarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for HarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn CourseHarness(props: HarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { CourseView {} }
}

async fn render_course(document: Option<&'static str>, store: InMemoryProgressStore) -> String {
    let app = Arc::new(TestApp {
        fetcher: Arc::new(TestFetcher { document }),
        store,
    });
    let mut dom = VirtualDom::new_with_props(CourseHarness, HarnessProps { app });
    dom.rebuild_in_place();

    let mut html = dioxus_ssr::render(&dom);
    for _ in 0..20 {
        if !html.contains("Loading course...") {
            break;
        }
        let _ = tokio::time::timeout(Duration::from_millis(50), dom.wait_for_work()).await;
        dom.render_immediate(&mut NoOpMutations);
        dom.process_events();
        html = dioxus_ssr::render(&dom);
    }
    html
}

#[tokio::test(flavor = "current_thread")]
async fn course_view_renders_restored_progress() {
    let store = InMemoryProgressStore::with_value("course-progress", r#"{"readLectures":[1]}"#);
    let html = render_course(
        Some(
            r#"{
                "lectures": [{"id": 1, "title": "Hull structure", "file": "1.html"}],
                "flashcards": [{"f": "Keel", "b": "Backbone of the hull"}],
                "quiz": []
            }"#,
        ),
        store,
    )
    .await;

    assert!(html.contains("Hull structure"), "{html}");
    assert!(html.contains("2 / 2 milestones completed"), "{html}");
    assert!(html.contains("Keel"), "{html}");
    assert!(!html.contains("Quiz"), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn course_view_renders_unavailable_state() {
    let html = render_course(None, InMemoryProgressStore::new()).await;
    assert!(html.contains("The course could not be loaded."), "{html}");
}
