//! サイト別セレクタ定義
//!
//! ホスト名にマッチしたプロファイルのセレクタを上から順に試す。
//! サイトのHTML構造が変わった場合はここのリストを更新する。

use std::sync::LazyLock;

/// ホスト名の判定条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMatcher {
    /// ホスト名に指定文字列を含む（大文字小文字を区別しない）
    Contains(String),
    /// 常にマッチ（汎用フォールバック用）
    Any,
}

impl HostMatcher {
    pub fn contains(token: impl Into<String>) -> Self {
        HostMatcher::Contains(token.into().to_lowercase())
    }

    /// `host` は小文字化済みであること
    fn accepts(&self, host: &str) -> bool {
        match self {
            HostMatcher::Contains(token) => host.contains(token.to_lowercase().as_str()),
            HostMatcher::Any => true,
        }
    }
}

/// 1サイト分のセレクタ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorProfile {
    name: String,
    matcher: HostMatcher,
    name_selectors: Vec<String>,
    price_selectors: Vec<String>,
    image_selectors: Vec<String>,
}

impl SelectorProfile {
    pub fn new(name: impl Into<String>, matcher: HostMatcher) -> Self {
        Self {
            name: name.into(),
            matcher,
            name_selectors: Vec::new(),
            price_selectors: Vec::new(),
            image_selectors: Vec::new(),
        }
    }

    pub fn with_name_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_price_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.price_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_image_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matcher(&self) -> &HostMatcher {
        &self.matcher
    }

    pub fn name_selectors(&self) -> &[String] {
        &self.name_selectors
    }

    pub fn price_selectors(&self) -> &[String] {
        &self.price_selectors
    }

    pub fn image_selectors(&self) -> &[String] {
        &self.image_selectors
    }

    pub fn is_fallback(&self) -> bool {
        self.matcher == HostMatcher::Any
    }
}

fn amazon_profile() -> SelectorProfile {
    SelectorProfile::new("amazon", HostMatcher::contains("amazon"))
        .with_name_selectors(["#productTitle"])
        .with_price_selectors([
            ".a-price[data-a-color=\"price\"] .a-offscreen",
            ".priceToPay .a-offscreen",
            "#corePrice_feature_div .a-offscreen",
        ])
        .with_image_selectors(["#landingImage", "#imgTagWrapperId img"])
}

fn trendyol_profile() -> SelectorProfile {
    SelectorProfile::new("trendyol", HostMatcher::contains("trendyol"))
        .with_name_selectors([".pr-in-nm"])
        .with_price_selectors([".pr-prc-slg"])
        .with_image_selectors([".gallery-container .p-card-img"])
}

fn generic_profile() -> SelectorProfile {
    SelectorProfile::new("generic", HostMatcher::Any)
        .with_name_selectors(["h1", ".product-title"])
        .with_price_selectors([".price", ".Price-amount"])
        .with_image_selectors(["img[data-main-image]", ".product-image-container img"])
}

static BUILTIN: LazyLock<SelectorRegistry> = LazyLock::new(|| SelectorRegistry::builder().build());

/// ホスト名 → セレクタプロファイルの対応表
///
/// サイト別プロファイルは登録順に判定し、どれにもマッチしなければ
/// 汎用フォールバックを返す。フォールバックは常に1つだけ存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRegistry {
    sites: Vec<SelectorProfile>,
    fallback: SelectorProfile,
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl SelectorRegistry {
    /// 組み込みプロファイル（amazon, trendyol, generic）
    pub fn builtin() -> &'static SelectorRegistry {
        &BUILTIN
    }

    /// 組み込みプロファイルを起点にしたビルダー
    pub fn builder() -> SelectorRegistryBuilder {
        SelectorRegistryBuilder::new()
            .profile(amazon_profile())
            .profile(trendyol_profile())
    }

    pub fn resolve_profile(&self, hostname: &str) -> &SelectorProfile {
        let host = hostname.to_lowercase();
        self.sites
            .iter()
            .find(|profile| profile.matcher.accepts(&host))
            .unwrap_or(&self.fallback)
    }

    /// 判定順に全プロファイルを返す（フォールバックが最後）
    pub fn profiles(&self) -> impl Iterator<Item = &SelectorProfile> {
        self.sites.iter().chain(std::iter::once(&self.fallback))
    }
}

pub struct SelectorRegistryBuilder {
    sites: Vec<SelectorProfile>,
    fallback: SelectorProfile,
}

impl Default for SelectorRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorRegistryBuilder {
    /// サイト別プロファイルなし、汎用フォールバックのみ
    pub fn new() -> Self {
        Self {
            sites: Vec::new(),
            fallback: generic_profile(),
        }
    }

    /// プロファイルを追加する
    ///
    /// `HostMatcher::Any` のプロファイルはフォールバックを置き換える
    pub fn profile(mut self, profile: SelectorProfile) -> Self {
        if profile.is_fallback() {
            self.fallback = profile;
        } else {
            self.sites.push(profile);
        }
        self
    }

    pub fn build(self) -> SelectorRegistry {
        SelectorRegistry {
            sites: self.sites,
            fallback: self.fallback,
        }
    }
}
