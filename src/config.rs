use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// ナビゲーション完了とみなす条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// loadイベントまで
    Load,
    /// loadイベント後、新規リクエストが一定時間発生しなくなるまで
    NetworkIdle,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub headless: bool,
    pub timeout: Duration,
    pub user_agent: String,
    pub wait_until: WaitUntil,
    pub chrome_executable: Option<PathBuf>,
    pub window_size: (u32, u32),
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            wait_until: WaitUntil::NetworkIdle,
            chrome_executable: None,
            window_size: (1280, 800),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数から設定を読み込む
    ///
    /// 解析できない値はデフォルトのまま（警告ログを出す）
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("CHROME_PATH").or_else(|| lookup("CHROMIUM_PATH")) {
            config.chrome_executable = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("SCRAPER_HEADLESS") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.headless = true,
                "0" | "false" | "no" => config.headless = false,
                other => warn!("Ignoring SCRAPER_HEADLESS={:?}", other),
            }
        }

        if let Some(raw) = lookup("SCRAPER_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring SCRAPER_TIMEOUT_SECS={:?}", raw),
            }
        }

        if let Some(ua) = lookup("SCRAPER_USER_AGENT") {
            if !ua.trim().is_empty() {
                config.user_agent = ua;
            }
        }

        config
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }
}
