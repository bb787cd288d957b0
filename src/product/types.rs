//! 商品ページ関連の型定義

use serde::{Deserialize, Serialize};

/// 抽出した商品データ
///
/// 成功として返されるのは `name` と `price` が両方とも空でない場合のみ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// 商品名
    pub name: String,
    /// 価格（通貨記号・書式はページの表記そのまま）
    pub price: String,
    /// 商品画像URL
    pub image_url: Option<String>,
    /// サイズ展開（現状は常に空）
    pub available_sizes: Vec<String>,
    /// カラー展開（現状は常に空）
    pub available_colors: Vec<String>,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, price: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            image_url,
            available_sizes: Vec::new(),
            available_colors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let record = ProductRecord::new("Widget", "$9.99", None);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Widget",
                "price": "$9.99",
                "imageUrl": null,
                "availableSizes": [],
                "availableColors": [],
            })
        );
    }
}
