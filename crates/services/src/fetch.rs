use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;

/// Retrieves raw text (the content document or a markup fragment) by locator.
///
/// Locators are relative to whatever base the implementation was built with.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the text behind `locator`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the locator is invalid or the resource cannot be read.
    async fn fetch(&self, locator: &str) -> Result<String, FetchError>;
}

/// Fetches over HTTP(S), resolving locators against a base URL.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// Build a fetcher rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: directory_url(base),
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        self.base
            .join(locator)
            .map_err(|err| FetchError::InvalidLocator(format!("{locator}: {err}")))
    }
}

/// Ensure the URL path ends with `/` so relative locators land inside it.
fn directory_url(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let url = self.resolve(locator)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        Ok(response.text().await?)
    }
}

/// Reads locators as paths below a content directory.
#[derive(Clone, Debug)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(locator);
        let stays_inside = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if locator.trim().is_empty() || !stays_inside {
            return Err(FetchError::InvalidLocator(locator.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Fetcher for DirectoryFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let path = self.resolve(locator)?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
