use reqwest::StatusCode;
use tokio::task::JoinHandle;
use url::Url;

use crate::effect::{Effect, Target};
use crate::fetcher::Fetcher;

/// The navigation fragment could not be obtained. Always recovered from.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("navigation fragment unavailable: GET {url}: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("navigation fragment unavailable: GET {url} returned {status}")]
    Status { url: Url, status: StatusCode },
    #[error("navigation fragment unavailable: reading body of {url}: {source}")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("navigation fragment unavailable: fetch task did not complete: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// No placeholder in the page; nothing was fetched.
    Skipped,
    Injected { placeholders: usize },
    Failed { reason: String },
}

/// In-flight fetch of the navigation fragment.
pub struct PendingNav {
    url: Url,
    task: JoinHandle<Result<String, NavError>>,
}

impl PendingNav {
    /// Starts the fetch on the runtime so it progresses while the caller does
    /// the synchronous boot steps.
    pub fn start(fetcher: &Fetcher, url: Url) -> Self {
        tracing::debug!(%url, "fetching navigation fragment");
        let fetcher = fetcher.clone();
        let task_url = url.clone();
        let task = tokio::spawn(async move { fetcher.get_text_uncached(task_url).await });
        Self { url, task }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn finish(self) -> Result<String, NavError> {
        self.task.await?
    }
}

/// Identical content for every placeholder.
pub fn plan(html: &str, placeholders: usize) -> Vec<Effect> {
    (0..placeholders)
        .map(|i| Effect::ReplaceInnerHtml {
            target: Target::Placeholder(i),
            html: html.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_placeholder_gets_the_same_markup() {
        let effects = plan("<nav></nav>", 2);
        assert_eq!(
            effects,
            vec![
                Effect::ReplaceInnerHtml {
                    target: Target::Placeholder(0),
                    html: "<nav></nav>".to_string(),
                },
                Effect::ReplaceInnerHtml {
                    target: Target::Placeholder(1),
                    html: "<nav></nav>".to_string(),
                },
            ]
        );
    }

    #[test]
    fn no_placeholders_no_effects() {
        assert!(plan("<nav></nav>", 0).is_empty());
    }
}
