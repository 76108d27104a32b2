//! Gemini API連携
//!
//! 画像1枚＋プロンプトを送り、構造化JSON（テキスト）を受け取る

use crate::error::{Result, StrainDexError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strain_dex_common::InlineImage;

/// 生成AIモデルとの境界
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// モデルの出力テキスト（JSONのはず）を返す
    async fn generate(&self, image: &InlineImage, prompt: &str, schema: &Value) -> Result<String>;
}

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

fn build_request(image: &InlineImage, prompt: &str, schema: &Value) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
                Part::Text { text: prompt.to_string() },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema.clone(),
        },
    }
}

fn first_text(response: GeminiResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|text| !text.trim().is_empty())
}

pub struct GeminiModel {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StrainDexError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, image: &InlineImage, prompt: &str, schema: &Value) -> Result<String> {
        let request = build_request(image, prompt, schema);

        let resp = self
            .http
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| StrainDexError::Model(format!("request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StrainDexError::Model(format!("API error {}: {}", status, text)));
        }

        let response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| StrainDexError::Model(format!("invalid response: {}", e.without_url())))?;

        first_text(response).ok_or_else(|| StrainDexError::Model("empty response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =============================================
    // Gemini リクエスト/レスポンス シリアライズテスト
    // =============================================

    #[test]
    fn test_request_serialize() {
        let image = InlineImage {
            mime_type: "image/png".to_string(),
            data: "AAAA".to_string(),
        };
        let schema = json!({"type": "OBJECT"});
        let request = build_request(&image, "prompt", &schema);

        let json = serde_json::to_value(&request).expect("シリアライズ失敗");
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "prompt");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_part_text_serialize() {
        let part = Part::Text { text: "Hello".to_string() };
        let json = serde_json::to_string(&part).expect("シリアライズ失敗");
        assert_eq!(json, r#"{"text":"Hello"}"#);
    }

    #[test]
    fn test_response_first_text() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "text": "{\"strain\": \"OG Kush\"}" }]
                }
            }]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(first_text(response).unwrap(), r#"{"strain": "OG Kush"}"#);
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(first_text(response).is_none());
    }

    #[test]
    fn test_url() {
        let model = GeminiModel::new("key", "gemini-2.5-flash", "https://example.com/").unwrap();
        assert_eq!(
            model.url(),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
