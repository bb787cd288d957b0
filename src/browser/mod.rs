//! ブラウザ（Chromium）によるページ取得
//!
//! リクエストごとにブラウザを起動し、レンダリング後のDOMを取得して終了する。

mod loader;

pub use loader::ChromiumLoader;
