//! 商品データ抽出
//!
//! プロファイルのセレクタを先頭から試し、最初にマッチした要素の値を採用する。
//! 商品名か価格のどちらかが取れなければ商品ページではないと判定する。

use thiserror::Error;
use tracing::debug;

use super::document::{Document, Element};
use super::registry::SelectorRegistry;
use super::types::ProductRecord;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("ページから商品情報を特定できませんでした")]
    NotAProductPage,
}

/// レジストリを参照して抽出を行う
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'r> {
    registry: &'r SelectorRegistry,
}

impl Default for Extractor<'static> {
    fn default() -> Self {
        Self::new(SelectorRegistry::builtin())
    }
}

impl<'r> Extractor<'r> {
    pub fn new(registry: &'r SelectorRegistry) -> Self {
        Self { registry }
    }

    pub fn extract<D: Document>(
        &self,
        document: &D,
        hostname: &str,
    ) -> Result<ProductRecord, ExtractionFailure> {
        let profile = self.registry.resolve_profile(hostname);
        debug!("Using selector profile '{}' for host {:?}", profile.name(), hostname);

        let name = first_text(document, profile.name_selectors());
        let price = first_text(document, profile.price_selectors());
        let image_url = first_image(document, profile.image_selectors());

        match (name, price) {
            (Some(name), Some(price)) => Ok(ProductRecord::new(name, price, image_url)),
            (name, price) => {
                debug!(
                    "Required fields missing (profile={}, name={:?}, price={:?})",
                    profile.name(),
                    name,
                    price
                );
                Err(ExtractionFailure::NotAProductPage)
            }
        }
    }
}

/// 組み込みレジストリで抽出する
pub fn extract<D: Document>(document: &D, hostname: &str) -> Result<ProductRecord, ExtractionFailure> {
    Extractor::default().extract(document, hostname)
}

/// 最初にマッチした要素で打ち切る（テキストが空でも後続のセレクタは見ない）
fn first_text<D: Document>(document: &D, selectors: &[String]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| document.select_first(selector))
        .map(|element| element.text())
        .filter(|text| !text.is_empty())
}

fn first_image<D: Document>(document: &D, selectors: &[String]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| document.select_first(selector))
        .and_then(|element| element.image_src())
}
