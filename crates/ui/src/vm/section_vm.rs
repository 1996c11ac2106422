use course_core::model::{SectionItemId, SectionKind};
use services::{FragmentState, SectionRenderer, SectionStatus};

use super::html::sanitize_html;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionBodyVm {
    Empty,
    Loading,
    Html(String),
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionVm {
    pub kind: SectionKind,
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub open: bool,
    pub body: SectionBodyVm,
    /// DOM id shared by the header button and its panel.
    pub dom_id: String,
}

#[must_use]
pub fn map_sections<I: SectionItemId>(renderer: &SectionRenderer<I>) -> Vec<SectionVm> {
    renderer
        .sections()
        .iter()
        .map(|section| {
            let id = section.id().raw();
            SectionVm {
                kind: I::KIND,
                id,
                title: section.title().to_string(),
                completed: section.status() == SectionStatus::Completed,
                open: section.is_open(),
                body: match section.fragment() {
                    FragmentState::NotRequested => SectionBodyVm::Empty,
                    FragmentState::Loading => SectionBodyVm::Loading,
                    FragmentState::Loaded(html) => SectionBodyVm::Html(sanitize_html(html)),
                    FragmentState::Failed(_) => SectionBodyVm::Error,
                },
                dom_id: format!("{}-{id}", I::KIND),
            }
        })
        .collect()
}
