use std::sync::Arc;

use services::{ContentLoadError, Course, CourseConfig, CourseSession, Fetcher};
use storage::ProgressStore;

/// What the composition root hands to the UI.
pub trait UiApp: Send + Sync {
    fn course_config(&self) -> CourseConfig;
    fn fetcher(&self) -> Arc<dyn Fetcher>;
    fn progress_store(&self) -> Arc<dyn ProgressStore>;
}

#[derive(Clone)]
pub struct AppContext {
    config: CourseConfig,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ProgressStore>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            config: app.course_config(),
            fetcher: app.fetcher(),
            store: app.progress_store(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CourseConfig {
        &self.config
    }

    /// Load the content document and restore progress.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError` if the content document cannot be loaded.
    pub async fn start_course(&self) -> Result<Course, ContentLoadError> {
        let session = CourseSession::start(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.store),
            &self.config,
        )
        .await?;
        Ok(Course::new(session))
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
