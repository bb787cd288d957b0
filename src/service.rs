use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tower::Service;
use tracing::{info, warn};
use url::Url;

use crate::browser::ChromiumLoader;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::product::{Extractor, HtmlDocument, ProductRecord, SelectorRegistry};
use crate::traits::{PageLoader, RenderedPage};

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    pub headless: Option<bool>,
    pub timeout: Option<Duration>,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headless: None,
            timeout: None,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// サービスの設定にリクエスト単位の上書きを適用する
    fn config(&self, base: &ScraperConfig) -> ScraperConfig {
        let mut config = base.clone();
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config
    }
}

/// URLを検証する（ページ取得前に弾く）
fn parse_target_url(raw: &str) -> Result<Url, ScraperError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScraperError::MissingInput);
    }

    let url = Url::parse(raw).map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ScraperError::InvalidUrl(format!(
            "未対応のスキーム '{}': {}",
            scheme, raw
        ))),
    }
}

/// レンダリング済みページから商品データを抽出する
///
/// `Html` は `Send` ではないため、await を挟まずにここで完結させる
fn extract_record(page: &RenderedPage, registry: &SelectorRegistry) -> Result<ProductRecord, ScraperError> {
    let document = HtmlDocument::parse(&page.html, Some(&page.url));
    let record = Extractor::new(registry).extract(&document, page.hostname())?;
    Ok(record)
}

/// tower::Serviceを実装したスクレイパーサービス
pub struct ScraperService<L = ChromiumLoader> {
    loader: Arc<L>,
    registry: Arc<SelectorRegistry>,
    config: ScraperConfig,
}

impl<L> Clone for ScraperService<L> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
        }
    }
}

impl ScraperService<ChromiumLoader> {
    pub fn new() -> Self {
        Self::with_loader(ChromiumLoader::new())
    }
}

impl Default for ScraperService<ChromiumLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: PageLoader> ScraperService<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            registry: Arc::new(SelectorRegistry::default()),
            config: ScraperConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: SelectorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }
}

impl<L: PageLoader + 'static> Service<ScrapeRequest> for ScraperService<L> {
    type Response = ProductRecord;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("Scrape request received: url={:?}", req.url);

        let loader = Arc::clone(&self.loader);
        let registry = Arc::clone(&self.registry);
        let config = req.config(&self.config);

        Box::pin(async move {
            let url = parse_target_url(&req.url)?;

            let page = loader.load(&url, &config).await?;

            let record = extract_record(&page, &registry)
                .inspect_err(|_| warn!("No product details found: url={}", page.url))?;

            info!(
                "Scrape completed: host={}, name={:?}, price={:?}",
                page.hostname(),
                record.name,
                record.price
            );

            Ok(record)
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use url::Url;

    use crate::config::ScraperConfig;
    use crate::error::ScraperError;
    use crate::traits::{PageLoader, RenderedPage};

    /// 固定のHTMLを返すテスト用ローダー
    pub struct StubLoader {
        html: Option<String>,
        final_url: Option<Url>,
        calls: AtomicUsize,
        seen_config: Mutex<Option<ScraperConfig>>,
    }

    impl StubLoader {
        pub fn html(html: &str) -> Self {
            Self {
                html: Some(html.to_string()),
                final_url: None,
                calls: AtomicUsize::new(0),
                seen_config: Mutex::new(None),
            }
        }

        /// 常にナビゲーションエラーを返す
        pub fn failing() -> Self {
            Self {
                html: None,
                final_url: None,
                calls: AtomicUsize::new(0),
                seen_config: Mutex::new(None),
            }
        }

        pub fn redirecting_to(mut self, url: &str) -> Self {
            self.final_url = Some(Url::parse(url).unwrap());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn seen_config(&self) -> Option<ScraperConfig> {
            self.seen_config.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageLoader for StubLoader {
        async fn load(&self, url: &Url, config: &ScraperConfig) -> Result<RenderedPage, ScraperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_config.lock().unwrap() = Some(config.clone());

            match &self.html {
                Some(html) => Ok(RenderedPage::new(
                    self.final_url.clone().unwrap_or_else(|| url.clone()),
                    html.clone(),
                )),
                None => Err(ScraperError::Navigation("net::ERR_CONNECTION_REFUSED".into())),
            }
        }
    }
}
