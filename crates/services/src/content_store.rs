use std::sync::Arc;

use course_core::model::{ContentBundle, ContentDocument};

use crate::error::ContentLoadError;
use crate::fetch::Fetcher;

/// Holds the content definition for the session. Loaded once, read-only after.
#[derive(Clone, Debug)]
pub struct ContentStore {
    bundle: Arc<ContentBundle>,
}

impl ContentStore {
    /// Fetch, parse and validate the content document.
    ///
    /// The failure is logged here; callers treat an error as "not ready" and
    /// initialise nothing. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError` on transport, parse or schema failure.
    pub async fn load(fetcher: &dyn Fetcher, document: &str) -> Result<Self, ContentLoadError> {
        let result = Self::load_inner(fetcher, document).await;
        match &result {
            Ok(store) => {
                let bundle = store.bundle();
                tracing::info!(
                    document,
                    lectures = bundle.lectures().len(),
                    activities = bundle.activities().len(),
                    flashcards = bundle.flashcards().len(),
                    questions = bundle.quiz().len(),
                    "content loaded"
                );
            }
            Err(err) => tracing::error!(document, error = %err, "failed to load content"),
        }
        result
    }

    async fn load_inner(fetcher: &dyn Fetcher, document: &str) -> Result<Self, ContentLoadError> {
        let raw = fetcher.fetch(document).await?;
        Self::from_json(&raw)
    }

    /// Parse and validate an already-fetched document.
    ///
    /// # Errors
    ///
    /// Returns `ContentLoadError::Parse` or `ContentLoadError::Invalid`.
    pub fn from_json(raw: &str) -> Result<Self, ContentLoadError> {
        let document: ContentDocument = serde_json::from_str(raw)?;
        let bundle = document.validate()?;
        Ok(Self::from_bundle(bundle))
    }

    #[must_use]
    pub fn from_bundle(bundle: ContentBundle) -> Self {
        Self {
            bundle: Arc::new(bundle),
        }
    }

    #[must_use]
    pub fn bundle(&self) -> &ContentBundle {
        &self.bundle
    }

    #[must_use]
    pub fn shared(&self) -> Arc<ContentBundle> {
        Arc::clone(&self.bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
            if locator == "data.json" {
                Ok(self.0.to_string())
            } else {
                Err(FetchError::InvalidLocator(locator.to_string()))
            }
        }
    }

    #[tokio::test]
    async fn loads_valid_document() {
        let fetcher = StaticFetcher(
            r#"{"lectures":[{"id":1,"title":"Intro","file":"1.html"}],"flashcards":[],"quiz":[]}"#,
        );
        let store = ContentStore::load(&fetcher, "data.json").await.unwrap();
        assert_eq!(store.bundle().lectures().len(), 1);
        assert_eq!(store.bundle().total_items(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let fetcher = StaticFetcher("{}");
        let err = ContentStore::load(&fetcher, "missing.json").await.unwrap_err();
        assert!(matches!(err, ContentLoadError::Fetch(_)));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let fetcher = StaticFetcher("{ not json");
        let err = ContentStore::load(&fetcher, "data.json").await.unwrap_err();
        assert!(matches!(err, ContentLoadError::Parse(_)));
    }

    #[test]
    fn schema_violation_is_invalid() {
        let err = ContentStore::from_json(
            r#"{"lectures":[],"flashcards":[],"quiz":[{"q":"?","o":[],"c":0,"e":""}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ContentLoadError::Invalid(_)));
    }
}
