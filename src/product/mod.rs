//! 商品ページ抽出モジュール
//!
//! レンダリング済みDOMから商品名・価格・画像URLを取り出す。
//! サイトごとのセレクタは [`SelectorRegistry`] に登録されたプロファイルで管理する。

mod document;
mod extractor;
mod registry;
mod types;

pub use document::{Document, Element, HtmlDocument, HtmlElement};
pub use extractor::{extract, ExtractionFailure, Extractor};
pub use registry::{HostMatcher, SelectorProfile, SelectorRegistry, SelectorRegistryBuilder};
pub use types::ProductRecord;
