use dioxus::prelude::*;

use crate::vm::{
    CourseIntent, FlashcardVm, ProgressVm, QuizOptionVm, QuizVm, SectionBodyVm, SectionVm,
    SummaryVm,
};

#[component]
pub fn ProgressHeader(progress: ProgressVm) -> Element {
    let badge_class = if progress.complete {
        "badge bg-success"
    } else {
        "badge"
    };

    rsx! {
        header { class: "progress-header",
            div { class: "progress",
                div { id: "global-progress", class: "progress-bar", style: "{progress.bar_style}" }
            }
            p { id: "progress-text", "{progress.label}" }
            span { id: "progress-badge", class: "{badge_class}", "{progress.badge}" }
        }
    }
}

#[component]
pub fn Accordion(sections: Vec<SectionVm>, on_intent: EventHandler<CourseIntent>) -> Element {
    rsx! {
        div { class: "accordion",
            for section in sections {
                AccordionItem { key: "{section.dom_id}", section: section.clone(), on_intent }
            }
        }
    }
}

#[component]
fn AccordionItem(section: SectionVm, on_intent: EventHandler<CourseIntent>) -> Element {
    let kind = section.kind;
    let id = section.id;
    let (icon_class, status_label) = if section.completed {
        ("status-icon status-completed", "Completed")
    } else {
        ("status-icon status-pending", "Pending")
    };
    let button_class = if section.open {
        "accordion-button"
    } else {
        "accordion-button collapsed"
    };

    rsx! {
        div { class: "accordion-item", id: "{section.dom_id}",
            h3 { class: "accordion-header",
                button {
                    class: "{button_class}",
                    onclick: move |_| on_intent.call(CourseIntent::ToggleSection { kind, id }),
                    span { class: "{icon_class}", title: "{status_label}" }
                    "{section.title}"
                }
                if !section.completed {
                    button {
                        class: "mark-read",
                        onclick: move |_| on_intent.call(CourseIntent::MarkRead { kind, id }),
                        "Mark as read"
                    }
                }
            }
            if section.open {
                div { class: "accordion-body",
                    match section.body.clone() {
                        SectionBodyVm::Empty | SectionBodyVm::Loading => rsx! {
                            p { class: "text-muted", "Loading content..." }
                        },
                        SectionBodyVm::Html(html) => rsx! {
                            div { class: "fragment", dangerous_inner_html: "{html}" }
                        },
                        SectionBodyVm::Error => rsx! {
                            p { class: "text-danger", "Could not load this content." }
                        },
                    }
                }
            }
        }
    }
}

#[component]
pub fn FlashcardPanel(card: FlashcardVm, on_intent: EventHandler<CourseIntent>) -> Element {
    rsx! {
        div { class: "flashcards",
            div {
                class: "{card.card_class}",
                onclick: move |_| on_intent.call(CourseIntent::FlipFlashcard),
                div { id: "fc-front", class: "flashcard-face front", "{card.front}" }
                div { id: "fc-back", class: "flashcard-face back", "{card.back}" }
            }
            div { class: "flashcard-nav",
                button { onclick: move |_| on_intent.call(CourseIntent::PreviousFlashcard), "Previous" }
                span { id: "fc-counter", "{card.counter}" }
                button { onclick: move |_| on_intent.call(CourseIntent::NextFlashcard), "Next" }
            }
        }
    }
}

#[component]
pub fn QuizPanel(quiz: QuizVm, on_intent: EventHandler<CourseIntent>) -> Element {
    rsx! {
        div { class: "quiz",
            div { class: "quiz-header",
                h3 { id: "quiz-question", "{quiz.prompt}" }
                span { id: "quiz-prog", "{quiz.counter}" }
            }
            div { class: "quiz-options",
                for option in quiz.options.clone() {
                    QuizOption { key: "{option.index}", option, on_intent }
                }
            }
            if let Some(text) = quiz.feedback.clone() {
                div { class: "{quiz.feedback_class}", "{text}" }
            }
            if quiz.next_visible {
                button {
                    id: "btn-next-q",
                    onclick: move |_| on_intent.call(CourseIntent::NextQuestion),
                    "Next question"
                }
            }
        }
    }
}

#[component]
fn QuizOption(option: QuizOptionVm, on_intent: EventHandler<CourseIntent>) -> Element {
    let index = option.index;
    rsx! {
        button {
            class: "{option.class}",
            disabled: option.disabled,
            onclick: move |_| on_intent.call(CourseIntent::SelectAnswer(index)),
            "{option.text}"
        }
    }
}

#[component]
pub fn SummaryPanel(summary: SummaryVm) -> Element {
    rsx! {
        match summary {
            SummaryVm::Hidden => rsx! {},
            SummaryVm::Loading => rsx! {
                section { class: "course-block summary",
                    h2 { "Summary" }
                    p { class: "text-muted", "Loading summary..." }
                }
            },
            SummaryVm::Html(html) => rsx! {
                section { class: "course-block summary",
                    h2 { "Summary" }
                    div { id: "summary-content", dangerous_inner_html: "{html}" }
                }
            },
            SummaryVm::Error => rsx! {
                section { class: "course-block summary",
                    h2 { "Summary" }
                    p { class: "text-danger", "Could not load the summary." }
                }
            },
        }
    }
}
