use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ScraperConfig, WaitUntil};
use crate::error::ScraperError;
use crate::traits::{PageLoader, RenderedPage};

/// ネットワークアイドル判定のインターバル（ミリ秒）
const NETWORK_IDLE_CHECK_INTERVAL_MS: u64 = 250;
/// 連続でアイドルと判定されるべき回数
const REQUIRED_IDLE_CHECKS: u32 = 2;

/// 直近500ms以内に開始されたリクエストが2件以下ならアイドルとみなす
const NETWORK_IDLE_SCRIPT: &str = r#"
    (() => {
        const now = performance.now();
        const recent = performance.getEntriesByType('resource').filter(e => {
            return (now - e.startTime) < 500 || e.responseEnd === 0;
        });
        return document.readyState === 'complete' && recent.length <= 2;
    })()
"#;

/// Chromium でページをレンダリングする [`PageLoader`]
#[derive(Debug, Clone, Default)]
pub struct ChromiumLoader;

impl ChromiumLoader {
    pub fn new() -> Self {
        Self
    }

    async fn launch(
        config: &ScraperConfig,
        user_data_dir: &Path,
    ) -> Result<(Browser, JoinHandle<()>), ScraperError> {
        info!("Launching browser...");

        let (width, height) = config.window_size;
        let mut builder = BrowserConfig::builder()
            .user_data_dir(user_data_dir)
            .window_size(width, height)
            .request_timeout(config.timeout);

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        Ok((browser, handler_task))
    }

    async fn render(
        browser: &Browser,
        url: &Url,
        config: &ScraperConfig,
    ) -> Result<RenderedPage, ScraperError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let result = Self::navigate_and_snapshot(&page, url, config).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        result
    }

    async fn navigate_and_snapshot(
        page: &Page,
        url: &Url,
        config: &ScraperConfig,
    ) -> Result<RenderedPage, ScraperError> {
        page.set_user_agent(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .map_err(|e| ScraperError::BrowserInit(format!("User-Agent設定エラー: {}", e)))?;

        let start = Instant::now();
        info!("Navigating to {}", url);

        match tokio::time::timeout(config.timeout, page.goto(url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(ScraperError::Navigation(e.to_string())),
            Err(_) => {
                return Err(ScraperError::Timeout(format!(
                    "{}秒以内にページを読み込めませんでした: {}",
                    config.timeout.as_secs(),
                    url
                )))
            }
        }

        if config.wait_until == WaitUntil::NetworkIdle {
            let remaining = config.timeout.saturating_sub(start.elapsed());
            Self::wait_network_idle(page, remaining).await;
        }

        let final_url = page
            .evaluate("window.location.href")
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?
            .into_value::<String>()
            .ok()
            .and_then(|href| Url::parse(&href).ok())
            .unwrap_or_else(|| url.clone());

        let html = page
            .content()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        info!(
            "Page rendered in {:?}: url={}, size={}bytes",
            start.elapsed(),
            final_url,
            html.len()
        );

        Ok(RenderedPage::new(final_url, html))
    }

    /// ネットワークが落ち着くまで待機（タイムアウトしてもエラーにはしない）
    async fn wait_network_idle(page: &Page, timeout: Duration) {
        let start = Instant::now();
        let mut idle_count = 0;

        while start.elapsed() < timeout {
            match page.evaluate(NETWORK_IDLE_SCRIPT).await {
                Ok(val) => {
                    if val.into_value::<bool>().unwrap_or(false) {
                        idle_count += 1;
                        if idle_count >= REQUIRED_IDLE_CHECKS {
                            debug!("Network idle after {:?}", start.elapsed());
                            return;
                        }
                    } else {
                        idle_count = 0;
                    }
                }
                Err(e) => {
                    debug!("Network idle check error: {}", e);
                    idle_count = 0;
                }
            }

            sleep(Duration::from_millis(NETWORK_IDLE_CHECK_INTERVAL_MS)).await;
        }

        warn!(
            "Network idle timeout after {:?}, proceeding anyway",
            start.elapsed()
        );
    }
}

/// 同時起動したブラウザ同士でプロファイルが衝突しないようにする
fn unique_user_data_dir() -> PathBuf {
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    std::env::temp_dir().join(format!("product-scraper-{}", unique_id))
}

/// ドロップ時にユーザーデータディレクトリを削除する
///
/// 起動失敗やリクエストのキャンセルで `load` が途中で抜けても残らない
struct UserDataDir(PathBuf);

impl UserDataDir {
    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for UserDataDir {
    fn drop(&mut self) {
        if !self.0.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            debug!("Failed to remove {:?}: {}", self.0, e);
        }
    }
}

#[async_trait]
impl PageLoader for ChromiumLoader {
    async fn load(&self, url: &Url, config: &ScraperConfig) -> Result<RenderedPage, ScraperError> {
        let user_data_dir = UserDataDir(unique_user_data_dir());
        let (mut browser, handler_task) = Self::launch(config, user_data_dir.path()).await?;

        let result = Self::render(&browser, url, config).await;

        info!("Closing browser...");
        if let Err(e) = browser.close().await {
            debug!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
        handler_task.abort();

        result
    }
}
