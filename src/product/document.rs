//! DOM問い合わせの抽象化
//!
//! 抽出ロジックはブラウザに依存せず、このトレイト越しにDOMを参照する。

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// CSSセレクタで問い合わせ可能なドキュメント
pub trait Document {
    type Node<'a>: Element
    where
        Self: 'a;

    /// セレクタに最初にマッチした要素（不正なセレクタはマッチなし扱い）
    fn select_first(&self, selector: &str) -> Option<Self::Node<'_>>;
}

pub trait Element {
    /// 表示テキスト（前後の空白を除去済み）
    fn text(&self) -> String;

    /// 解決済みの画像URL（画像要素でない、またはsrcが無い場合は None）
    fn image_src(&self) -> Option<String>;
}

/// HTML文字列から構築したドキュメント
///
/// ブラウザから取得したレンダリング済みDOMのスナップショットや、
/// テスト用の合成HTMLに使う。
pub struct HtmlDocument {
    html: Html,
    base_url: Option<Url>,
}

impl HtmlDocument {
    /// `page_url` は相対パスの画像URLを解決するために使う
    pub fn parse(html: &str, page_url: Option<&Url>) -> Self {
        let html = Html::parse_document(html);
        let base_url = page_url.map(|url| resolve_base(&html, url));
        Self { html, base_url }
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }
}

/// `<base href>` があればそれを優先する
fn resolve_base(html: &Html, page_url: &Url) -> Url {
    let href = Selector::parse("base[href]")
        .ok()
        .and_then(|sel| html.select(&sel).next())
        .and_then(|base| base.value().attr("href"));

    match href {
        Some(href) => page_url.join(href.trim()).unwrap_or_else(|_| page_url.clone()),
        None => page_url.clone(),
    }
}

impl Document for HtmlDocument {
    type Node<'a> = HtmlElement<'a>;

    fn select_first(&self, selector: &str) -> Option<HtmlElement<'_>> {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Skipping invalid selector {:?}: {:?}", selector, e);
                return None;
            }
        };

        self.html.select(&parsed).next().map(|element| HtmlElement {
            element,
            base_url: self.base_url.as_ref(),
        })
    }
}

/// 表示されない要素（中身はテキストに含めない）
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// 前後で改行される要素
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "td", "th",
    "tr", "ul",
];

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }

        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if HIDDEN_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        }
    }
}

pub struct HtmlElement<'a> {
    element: ElementRef<'a>,
    base_url: Option<&'a Url>,
}

impl Element for HtmlElement<'_> {
    fn text(&self) -> String {
        // 空白・改行の連続は1つにまとめる（innerText相当）
        let mut raw = String::new();
        collect_text(self.element, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn image_src(&self) -> Option<String> {
        if !self.element.value().name().eq_ignore_ascii_case("img") {
            return None;
        }

        // ブラウザの img.src は属性が無いと "" を返すが、ここでは None にそろえる
        let src = self.element.value().attr("src")?.trim();
        if src.is_empty() {
            return None;
        }

        match self.base_url {
            Some(base) => Some(
                base.join(src)
                    .map(|url| url.to_string())
                    .unwrap_or_else(|_| src.to_string()),
            ),
            None => Some(src.to_string()),
        }
    }
}
