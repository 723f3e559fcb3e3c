//! Validate, fetch, extract, summarize. Strictly in that order, one attempt.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extract::{extract, ExtractedContent};
use crate::llm::{OllamaClient, Summarizer};
use crate::scraper::{HttpFetcher, PageFetcher};
use crate::validate::is_valid_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Fetching,
    Extracting,
    Summarizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Summarizing => "summarizing",
        };
        f.write_str(name)
    }
}

pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Arc<dyn Summarizer>,
    fetch_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Arc<dyn Summarizer>,
        fetch_timeout: Duration,
    ) -> Self {
        Pipeline {
            fetcher,
            summarizer,
            fetch_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpFetcher::new()?),
            Arc::new(OllamaClient::new(config.backend.clone())?),
            config.fetch_timeout,
        ))
    }

    /// Runs one request end to end. Any stage failure ends the run; nothing
    /// partial is returned.
    pub async fn run(&self, url: &str) -> Result<String> {
        let start = tokio::time::Instant::now();

        debug!(stage = %Stage::Validating, %url);
        if !is_valid_url(url) {
            return Err(AppError::InvalidInput("Valid URL required".to_string()));
        }

        debug!(stage = %Stage::Fetching, %url);
        let html = self.fetch(url).await.inspect_err(|e| {
            warn!(stage = %Stage::Fetching, %url, error = %e, "Fetch failed");
        })?;

        debug!(stage = %Stage::Extracting, %url, html_len = html.len());
        let content = extract_off_thread(html, url.to_string()).await.inspect_err(|e| {
            warn!(stage = %Stage::Extracting, %url, error = %e, "Extraction failed");
        })?;

        debug!(stage = %Stage::Summarizing, %url, text_len = content.text.len());
        let summary = self.summarizer.summarize(&content).await.inspect_err(|e| {
            warn!(stage = %Stage::Summarizing, %url, error = %e, "Summarization failed");
        })?;

        info!(%url, elapsed = ?start.elapsed(), "Summary ready");
        Ok(summary)
    }

    /// Fetch bounded by `fetch_timeout`. The token is cancelled on expiry and,
    /// through the drop guard, on every other exit as well.
    async fn fetch(&self, url: &str) -> Result<String> {
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        tokio::select! {
            result = self.fetcher.fetch(url, &cancel) => result,
            () = tokio::time::sleep(self.fetch_timeout) => {
                cancel.cancel();
                Err(AppError::Timeout)
            }
        }
    }
}

async fn extract_off_thread(html: String, url: String) -> Result<ExtractedContent> {
    tokio::task::spawn_blocking(move || extract(&html, &url))
        .await
        .map_err(|e| AppError::Unclassified(format!("Extraction task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StaticFetcher {
        html: &'static str,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn new(html: &'static str) -> Arc<Self> {
            Arc::new(StaticFetcher { html, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str, _cancel: &CancellationToken) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.html.to_string())
        }
    }

    /// Never answers on its own.
    struct HangingFetcher;

    #[async_trait]
    impl PageFetcher for HangingFetcher {
        async fn fetch(&self, _url: &str, _cancel: &CancellationToken) -> Result<String> {
            std::future::pending().await
        }
    }

    struct FailingFetcher(u16);

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str, _cancel: &CancellationToken) -> Result<String> {
            Err(AppError::http_status(self.0))
        }
    }

    #[derive(Default)]
    struct RecordingSummarizer {
        seen: Mutex<Vec<ExtractedContent>>,
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        async fn summarize(&self, content: &ExtractedContent) -> Result<String> {
            self.seen.lock().unwrap().push(content.clone());
            Ok("- summary".to_string())
        }
    }

    struct BrokenSummarizer;

    #[async_trait]
    impl Summarizer for BrokenSummarizer {
        async fn summarize(&self, _content: &ExtractedContent) -> Result<String> {
            Err(AppError::SummarizationFailed("Ollama request failed: 500 model not found".into()))
        }
    }

    const PAGE: &str = "<html><body><article><p>Tokio 1.40 released.</p></article></body></html>";

    #[tokio::test]
    async fn invalid_url_never_reaches_the_fetcher() {
        let fetcher = StaticFetcher::new(PAGE);
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = Pipeline::new(fetcher.clone(), summarizer.clone(), Duration::from_secs(8));

        for url in ["", "not a url", "ftp://example.com/file", "https://nodot"] {
            let err = pipeline.run(url).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "{url:?} gave {err:?}");
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summarizer_gets_url_and_extracted_text_once() {
        let fetcher = StaticFetcher::new(PAGE);
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = Pipeline::new(fetcher, summarizer.clone(), Duration::from_secs(8));

        let summary = pipeline.run("https://tokio.rs/blog").await.unwrap();

        assert_eq!(summary, "- summary");
        let seen = summarizer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "Tokio 1.40 released.");
        assert_eq!(seen[0].source_url, "https://tokio.rs/blog");
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_fetch_times_out_at_the_bound() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = Pipeline::new(Arc::new(HangingFetcher), summarizer.clone(), Duration::from_millis(8000));

        let start = tokio::time::Instant::now();
        let err = pipeline.run("https://example.com").await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, AppError::Timeout));
        assert!(elapsed >= Duration::from_millis(7900), "timed out early: {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(8100), "timed out late: {elapsed:?}");
        assert!(summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_status_is_preserved() {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = Pipeline::new(Arc::new(FailingFetcher(404)), summarizer.clone(), Duration::from_secs(8));

        let err = pipeline.run("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::FetchFailed { status: Some(404), .. }));
        assert_eq!(err.to_string(), "Failed to fetch URL: 404");
        assert!(summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_page_skips_the_backend() {
        let fetcher = StaticFetcher::new("<html><body><nav>menu</nav><script>x()</script>  </body></html>");
        let summarizer = Arc::new(RecordingSummarizer::default());
        let pipeline = Pipeline::new(fetcher, summarizer.clone(), Duration::from_secs(8));

        let err = pipeline.run("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::NoContent));
        assert!(summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn backend_errors_pass_through_unretried() {
        let fetcher = StaticFetcher::new(PAGE);
        let pipeline = Pipeline::new(fetcher.clone(), Arc::new(BrokenSummarizer), Duration::from_secs(8));

        let err = pipeline.run("https://example.com").await.unwrap_err();

        assert!(matches!(err, AppError::SummarizationFailed(_)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Fetching.to_string(), "fetching");
        assert_eq!(Stage::Summarizing.to_string(), "summarizing");
    }
}
