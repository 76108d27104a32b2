//! プロンプト生成モジュール
//!
//! - build_analysis_prompt: 画像解析＋レビュー書き直し用プロンプト
//! - response_schema: モデルに渡す構造化出力スキーマ

use serde_json::{json, Value};

/// スキーマで必須とする項目（ExtractedProductInfoと1対1）
pub const REQUIRED_FIELDS: &[&str] = &[
    "manufacturer",
    "productName",
    "strain",
    "potency",
    "otherDetails",
    "enhancedReview",
];

/// 解析プロンプト生成
///
/// # Arguments
/// * `review` - ユーザーが入力したレビュー（加工せず埋め込む）
pub fn build_analysis_prompt(review: &str) -> String {
    format!(
        r#"You are a sophisticated cannabis product analysis tool for a 'Pokédex for Weed' app. Your task is to analyze an image of a cannabis product package and a user's review, then return a structured JSON object.

From the IMAGE, extract:
- manufacturer: The brand that produced the product.
- productName: The product's name.
- strain: The cannabis strain.
- potency: The THC/CBD content.
- otherDetails: An array of any other relevant text on the packaging.

From the USER'S REVIEW, rewrite it to be more eloquent and descriptive, like a connoisseur would.

User's Review: "{review}"

Return ONLY a single, valid JSON object matching the defined schema. Do not add any other text or markdown."#
    )
}

/// 構造化出力スキーマ（Gemini `responseSchema` 形式）
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "manufacturer": {
                "type": "STRING",
                "description": "The company or brand that produced the product."
            },
            "productName": {
                "type": "STRING",
                "description": "The specific name of the product."
            },
            "strain": {
                "type": "STRING",
                "description": "The strain of the cannabis (e.g., Blue Dream, OG Kush)."
            },
            "potency": {
                "type": "STRING",
                "description": "The THC/CBD content, usually as a percentage or mg/g."
            },
            "otherDetails": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "An array of other relevant info (e.g., weight, lot number, product type)."
            },
            "enhancedReview": {
                "type": "STRING",
                "description": "The user's review, rewritten to be more eloquent and descriptive."
            }
        },
        "required": REQUIRED_FIELDS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_review_verbatim() {
        let prompt = build_analysis_prompt("smooth and relaxing");
        assert!(prompt.contains(r#"User's Review: "smooth and relaxing""#));
        assert!(prompt.contains("Return ONLY a single, valid JSON object"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);

        for field in REQUIRED_FIELDS {
            assert!(schema["properties"].get(*field).is_some(), "{} がproperties に無い", field);
        }
    }

    #[test]
    fn test_schema_other_details_is_string_array() {
        let schema = response_schema();
        assert_eq!(schema["properties"]["otherDetails"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["otherDetails"]["items"]["type"], "STRING");
    }
}
