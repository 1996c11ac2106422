use course_core::model::SummarySource;

use crate::error::FetchError;
use crate::fetch::Fetcher;

/// Closing summary of the module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummaryState {
    /// The content document declares no summary.
    #[default]
    Absent,
    Loading,
    Loaded(String),
    Inline(Vec<String>),
    Failed(String),
}

impl SummaryState {
    /// Initial state for `source`, plus the locator to fetch if one is needed.
    #[must_use]
    pub fn begin(source: &SummarySource) -> (Self, Option<String>) {
        match source {
            SummarySource::None => (Self::Absent, None),
            SummarySource::Inline(lines) => (Self::Inline(lines.clone()), None),
            SummarySource::File(locator) => (Self::Loading, Some(locator.clone())),
        }
    }

    /// State after the summary fetch finished.
    #[must_use]
    pub fn finish(result: Result<String, FetchError>) -> Self {
        match result {
            Ok(html) => Self::Loaded(html),
            Err(err) => {
                tracing::warn!(error = %err, "summary failed to load");
                Self::Failed(err.to_string())
            }
        }
    }

    /// Resolve `source` completely, fetching when needed.
    pub async fn load(source: &SummarySource, fetcher: &dyn Fetcher) -> Self {
        match Self::begin(source) {
            (_, Some(locator)) => Self::finish(fetcher.fetch(&locator).await),
            (state, None) => state,
        }
    }
}
