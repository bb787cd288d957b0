//! ECサイト商品ページ スクレイパーライブラリ
//!
//! - 商品ページのURLからブラウザでレンダリング済みDOMを取得
//! - サイト別セレクタで商品名・価格・画像URLを抽出
//!
//! # 使用例
//!
//! ```rust,ignore
//! use product_scraper::{ScrapeRequest, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new("https://www.amazon.com/dp/B000000000")
//!         .with_headless(true);
//!
//!     let record = service.call(request).await.unwrap();
//!     println!("{} {}", record.name, record.price);
//! }
//! ```
//!
//! # 抽出のみ（ブラウザなし）
//!
//! ```rust
//! use product_scraper::product::{extract, HtmlDocument};
//!
//! let html = r#"<h1>Gadget</h1><span class="price">$5.00</span>"#;
//! let document = HtmlDocument::parse(html, None);
//! let record = extract(&document, "shop.example.com").unwrap();
//! assert_eq!(record.name, "Gadget");
//! assert_eq!(record.price, "$5.00");
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod http;
pub mod product;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use browser::ChromiumLoader;
pub use config::{ScraperConfig, WaitUntil};
pub use error::{FailureKind, ScraperError};
pub use product::{ExtractionFailure, Extractor, ProductRecord, SelectorProfile, SelectorRegistry};
pub use service::{ScrapeRequest, ScraperService};
pub use traits::{PageLoader, RenderedPage};
