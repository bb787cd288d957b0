use thiserror::Error;

use crate::product::ExtractionFailure;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("URLが指定されていません")]
    MissingInput,

    #[error("不正なURL: {0}")]
    InvalidUrl(String),

    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("商品ページではありません")]
    NotAProductPage,
}

/// 呼び出し側に返す失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingInput,
    InvalidInput,
    PageLoadFailure,
    NotAProductPage,
}

impl ScraperError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ScraperError::MissingInput => FailureKind::MissingInput,
            ScraperError::InvalidUrl(_) => FailureKind::InvalidInput,
            ScraperError::BrowserInit(_)
            | ScraperError::Navigation(_)
            | ScraperError::Timeout(_)
            | ScraperError::JavaScript(_) => FailureKind::PageLoadFailure,
            ScraperError::NotAProductPage => FailureKind::NotAProductPage,
        }
    }
}

impl From<ExtractionFailure> for ScraperError {
    fn from(failure: ExtractionFailure) -> Self {
        match failure {
            ExtractionFailure::NotAProductPage => ScraperError::NotAProductPage,
        }
    }
}
