use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::fetch::{DirectoryFetcher, Fetcher, HttpFetcher};

pub const DEFAULT_DOCUMENT: &str = "data.json";
pub const DEFAULT_PROGRESS_KEY: &str = "course-progress";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where the content document and its fragments live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentLocation {
    Url(Url),
    Directory(PathBuf),
}

impl ContentLocation {
    /// `http(s)://` values are URLs; anything else is a directory path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty value or an unparseable URL.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyContentLocation);
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
                raw: trimmed.to_string(),
                source,
            })?;
            return Ok(Self::Url(url));
        }
        Ok(Self::Directory(PathBuf::from(trimmed)))
    }

    /// Split a location that points straight at a `.json` document into
    /// its base and document name.
    fn split_document(self) -> (Self, Option<String>) {
        match self {
            Self::Url(url) if url.path().ends_with(".json") => {
                let document = url
                    .path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .map(str::to_string);
                match (url.join("./"), document) {
                    (Ok(base), Some(document)) => (Self::Url(base), Some(document)),
                    _ => (Self::Url(url), None),
                }
            }
            Self::Directory(path) if path.extension().is_some_and(|ext| ext == "json") => {
                let document = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                let parent = path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                (Self::Directory(parent), document)
            }
            other => (other, None),
        }
    }
}

/// Settings for one course session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseConfig {
    pub content: ContentLocation,
    pub document: String,
    pub progress_key: String,
    pub http_timeout: Duration,
}

impl CourseConfig {
    #[must_use]
    pub fn new(content: ContentLocation) -> Self {
        Self {
            content,
            document: DEFAULT_DOCUMENT.to_string(),
            progress_key: DEFAULT_PROGRESS_KEY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Read `COURSE_CONTENT`, `COURSE_DOCUMENT`, `COURSE_PROGRESS_KEY` and
    /// `COURSE_HTTP_TIMEOUT_SECS`. Content defaults to the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`CourseConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let content = lookup("COURSE_CONTENT").unwrap_or_else(|| ".".to_string());
        let mut config = Self::new(ContentLocation::Directory(PathBuf::from(".")))
            .with_content_arg(&content)?;

        if let Some(document) = lookup("COURSE_DOCUMENT").filter(|v| !v.trim().is_empty()) {
            config.document = document;
        }
        if let Some(key) = lookup("COURSE_PROGRESS_KEY").filter(|v| !v.trim().is_empty()) {
            config.progress_key = key;
        }
        if let Some(raw) = lookup("COURSE_HTTP_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: "COURSE_HTTP_TIMEOUT_SECS",
                    raw,
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Point the config at `raw` (URL, directory, or a `.json` document in either).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `raw` is empty or an invalid URL.
    pub fn with_content_arg(mut self, raw: &str) -> Result<Self, ConfigError> {
        let (content, document) = ContentLocation::parse(raw)?.split_document();
        self.content = content;
        if let Some(document) = document {
            self.document = document;
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = document.into();
        self
    }

    #[must_use]
    pub fn with_progress_key(mut self, key: impl Into<String>) -> Self {
        self.progress_key = key.into();
        self
    }

    /// Build the fetcher serving both the document and its fragments.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Http` if the HTTP client cannot be built.
    pub fn build_fetcher(&self) -> Result<Arc<dyn Fetcher>, ConfigError> {
        match &self.content {
            ContentLocation::Url(url) => {
                let fetcher = HttpFetcher::new(url.clone(), self.http_timeout)?;
                Ok(Arc::new(fetcher))
            }
            ContentLocation::Directory(path) => Ok(Arc::new(DirectoryFetcher::new(path.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = CourseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.content, ContentLocation::Directory(PathBuf::from(".")));
        assert_eq!(config.document, DEFAULT_DOCUMENT);
        assert_eq!(config.progress_key, DEFAULT_PROGRESS_KEY);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn url_pointing_at_document_is_split() {
        let config = CourseConfig::from_lookup(lookup(&[(
            "COURSE_CONTENT",
            "https://example.org/ethics/data.json",
        )]))
        .unwrap();
        assert_eq!(
            config.content,
            ContentLocation::Url(Url::parse("https://example.org/ethics/").unwrap())
        );
        assert_eq!(config.document, "data.json");
    }

    #[test]
    fn directory_document_is_split() {
        let config = CourseConfig::new(ContentLocation::Directory(PathBuf::from(".")))
            .with_content_arg("course/module.json")
            .unwrap();
        assert_eq!(config.content, ContentLocation::Directory(PathBuf::from("course")));
        assert_eq!(config.document, "module.json");

        let config = CourseConfig::new(ContentLocation::Directory(PathBuf::from("x")))
            .with_content_arg("module.json")
            .unwrap();
        assert_eq!(config.content, ContentLocation::Directory(PathBuf::from(".")));
    }

    #[test]
    fn env_overrides_apply() {
        let config = CourseConfig::from_lookup(lookup(&[
            ("COURSE_CONTENT", "/srv/course"),
            ("COURSE_DOCUMENT", "course.json"),
            ("COURSE_PROGRESS_KEY", "maritime"),
            ("COURSE_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.content, ContentLocation::Directory(PathBuf::from("/srv/course")));
        assert_eq!(config.document, "course.json");
        assert_eq!(config.progress_key, "maritime");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CourseConfig::from_lookup(lookup(&[("COURSE_HTTP_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            ContentLocation::parse("  "),
            Err(ConfigError::EmptyContentLocation)
        ));
        assert!(matches!(
            ContentLocation::parse("https://exa mple.org"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
