use async_trait::async_trait;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::ScraperError;

/// ブラウザでレンダリングしたページ
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// リダイレクト後の最終URL
    pub url: Url,
    /// レンダリング済みDOM (outerHTML)
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// ホスト名（無ければ空文字）
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }
}

#[async_trait]
pub trait PageLoader: Send + Sync {
    /// URLを開き、レンダリング完了後のDOMを取得する
    ///
    /// 失敗はすべてページ取得失敗として返す（リトライはしない）
    async fn load(&self, url: &Url, config: &ScraperConfig) -> Result<RenderedPage, ScraperError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_of_final_url() {
        let page = RenderedPage::new(
            Url::parse("https://www.amazon.com/dp/B000000?th=1").unwrap(),
            "<html></html>",
        );
        assert_eq!(page.hostname(), "www.amazon.com");
    }

    #[test]
    fn test_hostname_missing() {
        let page = RenderedPage::new(Url::parse("data:text/html,hi").unwrap(), "");
        assert_eq!(page.hostname(), "");
    }
}
