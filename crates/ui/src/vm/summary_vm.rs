use services::SummaryState;

use super::html::{markdown_to_html, sanitize_html};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryVm {
    Hidden,
    Loading,
    Html(String),
    Error,
}

#[must_use]
pub fn map_summary(state: &SummaryState) -> SummaryVm {
    match state {
        SummaryState::Absent => SummaryVm::Hidden,
        SummaryState::Loading => SummaryVm::Loading,
        SummaryState::Loaded(html) => SummaryVm::Html(sanitize_html(html)),
        SummaryState::Inline(lines) => {
            let html = lines
                .iter()
                .map(|line| markdown_to_html(line))
                .collect::<String>();
            SummaryVm::Html(html)
        }
        SummaryState::Failed(_) => SummaryVm::Error,
    }
}
