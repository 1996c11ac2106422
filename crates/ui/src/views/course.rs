use dioxus::prelude::*;
use services::Course;

use crate::context::AppContext;
use crate::views::components::{Accordion, FlashcardPanel, ProgressHeader, QuizPanel, SummaryPanel};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CourseIntent, CourseVm, IntentStep, begin_intent, finish_open, map_course};

#[derive(Clone, PartialEq)]
struct LoadedCourse {
    course: Course,
    vm: CourseVm,
}

/// Loads the course and renders it, or the unavailable state.
#[component]
pub fn CourseView() -> Element {
    let ctx = use_context::<AppContext>();

    let resource = use_resource(move || {
        let ctx = ctx.clone();
        async move {
            let course = ctx.start_course().await.map_err(|err| {
                tracing::error!(error = %err, "course unavailable");
                ViewError::CourseUnavailable
            })?;
            let vm = map_course(&*course.lock().await);
            Ok::<_, ViewError>(LoadedCourse { course, vm })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page course",
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { class: "text-muted", "Loading course..." }
                },
                ViewState::Ready(loaded) => rsx! {
                    CoursePage { course: loaded.course.clone(), initial: loaded.vm.clone() }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "text-danger", "{err.message()}" }
                },
            }
        }
    }
}

#[component]
pub fn CoursePage(course: Course, initial: CourseVm) -> Element {
    let vm = use_signal(|| initial.clone());

    let dispatch = use_callback(move |intent: CourseIntent| {
        let course = course.clone();
        let mut vm = vm;
        spawn(async move {
            match begin_intent(&course, intent).await {
                IntentStep::Done(next) => vm.set(next),
                IntentStep::Fetch {
                    vm: next,
                    pending,
                    fetcher,
                } => {
                    // Show the loading placeholder while the body is fetched.
                    vm.set(next);
                    let loaded = finish_open(&course, pending, fetcher).await;
                    vm.set(loaded);
                }
            }
        });
    });

    let current = vm.read().clone();

    rsx! {
        ProgressHeader { progress: current.progress.clone() }

        section { class: "course-block",
            h2 { "Lectures" }
            Accordion { sections: current.lectures.clone(), on_intent: dispatch }
        }

        if !current.activities.is_empty() {
            section { class: "course-block",
                h2 { "Activities" }
                Accordion { sections: current.activities.clone(), on_intent: dispatch }
            }
        }

        if let Some(card) = current.flashcard.clone() {
            section { class: "course-block",
                h2 { "Flashcards" }
                FlashcardPanel { card, on_intent: dispatch }
            }
        }

        if let Some(quiz) = current.quiz.clone() {
            section { class: "course-block",
                h2 { "Quiz" }
                QuizPanel { quiz, on_intent: dispatch }
            }
        }

        SummaryPanel { summary: current.summary.clone() }
    }
}
