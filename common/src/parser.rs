//! モデルレスポンスパーサー
//!
//! モデルの出力テキストからJSONオブジェクトを取り出し、
//! ExtractedProductInfo の形に揃える（欠損・型違いはセンチネルで補完）

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::ExtractedProductInfo;

/// 文字列項目が得られなかった場合の値
pub const NOT_AVAILABLE: &str = "N/A";

/// enhancedReview が得られなかった場合の値
pub const REVIEW_UNAVAILABLE: &str = "Could not generate review.";

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック（`{` で始まる出力では探さない）
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use strain_dex_common::extract_json_object;
///
/// let response = "Sure! {\"strain\": \"OG Kush\"}";
/// assert_eq!(extract_json_object(response).unwrap(), "{\"strain\": \"OG Kush\"}");
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    let plain_object = response.trim_start().starts_with('{');

    if let Some(start_marker) = response.find("```json").filter(|_| !plain_object) {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSON object not found".into()))
}

/// モデル出力をパースして6項目を揃える
///
/// JSONオブジェクトでない出力はエラー。オブジェクトであれば
/// 欠損項目があっても補完して必ず成功する。
pub fn parse_product_info(response: &str) -> Result<ExtractedProductInfo> {
    let json_str = extract_json_object(response)?;
    let value: Value = serde_json::from_str(json_str.trim())?;

    let Some(map) = value.as_object() else {
        return Err(Error::Parse("JSON object not found".into()));
    };

    Ok(coerce_product_info(map))
}

/// 任意のJSONオブジェクトから ExtractedProductInfo を組み立てる
pub fn coerce_product_info(map: &Map<String, Value>) -> ExtractedProductInfo {
    ExtractedProductInfo {
        manufacturer: get_string(map, "manufacturer").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        product_name: get_string(map, "productName").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        strain: get_string(map, "strain").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        potency: get_string(map, "potency").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        other_details: get_string_list(map, "otherDetails"),
        enhanced_review: get_string(map, "enhancedReview")
            .unwrap_or_else(|| REVIEW_UNAVAILABLE.to_string()),
    }
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    scalar_to_string(map.get(key)?)
}

fn get_string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}

/// 文字列・数値・真偽値を文字列化（空白のみ・null・配列・オブジェクトはNone）
fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
