//! 解析クライアント
//!
//! `POST /api/analyze` を1回だけ呼び出す。リトライ・タイムアウト設定なし。

use crate::error::{Result, StrainDexError};
use async_trait::async_trait;
use serde_json::Value;
use strain_dex_common::{
    extract_base64_from_data_url, extract_mime_type_from_data_url, AnalyzeRequest,
    ExtractedProductInfo,
};

/// エンドポイントがメッセージを返さなかった場合のエラーメッセージ
pub const GENERIC_FAILURE: &str = "Failed to analyze product";

pub const ANALYZE_PATH: &str = "/api/analyze";

/// 画像とレビューから ExtractedProductInfo を得る
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, image: &str, review: &str) -> Result<ExtractedProductInfo>;
}

/// HTTP経由で解析エンドポイントを呼ぶクライアント
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("strain-dex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StrainDexError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, image: &str, review: &str) -> Result<ExtractedProductInfo> {
        let payload_len = extract_base64_from_data_url(image).map(str::len).unwrap_or(0);
        tracing::debug!(
            endpoint = %self.endpoint,
            mime_type = extract_mime_type_from_data_url(image),
            payload_len,
            "sending analysis request"
        );

        let request = AnalyzeRequest {
            image: image.to_string(),
            review: review.to_string(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "analysis request failed");
                StrainDexError::Analysis(GENERIC_FAILURE.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "analysis endpoint returned an error");
        }

        interpret_response(status.is_success(), value)
    }
}

/// エンドポイントのレスポンスを解釈
///
/// - `error` 項目があれば失敗（メッセージを採用）
/// - 非成功ステータスは失敗
/// - 6項目が揃っていなければ失敗（部分的な結果は返さない）
pub fn interpret_response(success: bool, body: Value) -> Result<ExtractedProductInfo> {
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(GENERIC_FAILURE);
        return Err(StrainDexError::Analysis(message.to_string()));
    }

    if !success {
        return Err(StrainDexError::Analysis(GENERIC_FAILURE.to_string()));
    }

    serde_json::from_value(body).map_err(|e| {
        tracing::warn!(error = %e, "analysis response is incomplete");
        StrainDexError::Analysis(GENERIC_FAILURE.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_body() -> Value {
        json!({
            "manufacturer": "Acme",
            "productName": "Blue Dream 1g",
            "strain": "Blue Dream",
            "potency": "22% THC",
            "otherDetails": ["1g"],
            "enhancedReview": "A velvety, tranquil experience..."
        })
    }

    fn message(result: Result<ExtractedProductInfo>) -> String {
        match result {
            Err(StrainDexError::Analysis(msg)) => msg,
            other => panic!("Analysisエラーを期待: {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_url() {
        let client = AnalysisClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/analyze");
    }

    #[test]
    fn test_interpret_success() {
        let info = interpret_response(true, full_body()).unwrap();
        assert_eq!(info.product_name, "Blue Dream 1g");
        assert_eq!(info.other_details, vec!["1g"]);
    }

    #[test]
    fn test_interpret_error_field_wins() {
        let body = json!({"error": "Both image and review fields are required."});
        assert_eq!(
            message(interpret_response(false, body)),
            "Both image and review fields are required."
        );

        // 成功ステータスでも error があれば失敗
        let mut body = full_body();
        body["error"] = json!("quota exceeded");
        assert_eq!(message(interpret_response(true, body)), "quota exceeded");
    }

    #[test]
    fn test_interpret_non_success_without_message() {
        assert_eq!(message(interpret_response(false, Value::Null)), GENERIC_FAILURE);
        assert_eq!(message(interpret_response(false, json!({"error": 42}))), GENERIC_FAILURE);
    }

    #[test]
    fn test_interpret_incomplete_body() {
        let mut body = full_body();
        body.as_object_mut().unwrap().remove("potency");
        assert_eq!(message(interpret_response(true, body)), GENERIC_FAILURE);
    }
}
