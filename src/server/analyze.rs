//! `POST /api/analyze` ハンドラ

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use strain_dex_common::{
    build_analysis_prompt, parse_product_info, response_schema, ErrorResponse,
    ExtractedProductInfo, InlineImage,
};

use super::AppState;

pub const MISSING_FIELDS_MESSAGE: &str = "Both image and review fields are required.";
pub const INVALID_IMAGE_MESSAGE: &str = "Image must be a base64-encoded data URI.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze product.";

/// エンドポイントのエラー（詳細はログのみ、レスポンスには出さない）
#[derive(Debug)]
pub enum EndpointError {
    BadRequest(&'static str),
    MethodNotAllowed,
    AnalysisFailed,
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            EndpointError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            EndpointError::MethodNotAllowed => {
                let body = Json(ErrorResponse { error: "Method Not Allowed".into() });
                return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")], body)
                    .into_response();
            }
            EndpointError::AnalysisFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, ANALYSIS_FAILED_MESSAGE)
            }
        };

        (status, Json(ErrorResponse { error: message.into() })).into_response()
    }
}

/// リクエストボディから image / review を取り出す
///
/// どちらも空でない文字列であること。JSONとして読めないボディは空扱い。
pub fn validate_request(body: &[u8]) -> Result<(String, String), EndpointError> {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match (field("image"), field("review")) {
        (Some(image), Some(review)) => Ok((image, review)),
        _ => Err(EndpointError::BadRequest(MISSING_FIELDS_MESSAGE)),
    }
}

pub async fn analyze_product(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExtractedProductInfo>, EndpointError> {
    let (image, review) = validate_request(&body)?;

    let image = InlineImage::parse(&image)
        .map_err(|_| EndpointError::BadRequest(INVALID_IMAGE_MESSAGE))?;

    let prompt = build_analysis_prompt(&review);
    let schema = response_schema();

    let text = state
        .model
        .generate(&image, &prompt, &schema)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error analyzing product with model");
            EndpointError::AnalysisFailed
        })?;

    let info = parse_product_info(&text).map_err(|e| {
        tracing::error!(error = %e, response_len = text.len(), "Model returned unusable output");
        EndpointError::AnalysisFailed
    })?;

    tracing::info!(
        mime_type = %image.mime_type,
        product = %info.product_name,
        strain = %info.strain,
        "product analyzed"
    );

    Ok(Json(info))
}

/// POST以外
pub async fn method_not_allowed() -> EndpointError {
    EndpointError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request_ok() {
        let body = br#"{"image": "data:image/png;base64,AAAA", "review": "smooth"}"#;
        let (image, review) = validate_request(body).unwrap();
        assert_eq!(image, "data:image/png;base64,AAAA");
        assert_eq!(review, "smooth");
    }

    #[test]
    fn test_validate_request_rejects() {
        let cases: &[&[u8]] = &[
            br#"{"image": "data:image/png;base64,AAAA"}"#,
            br#"{"review": "smooth"}"#,
            br#"{"image": 42, "review": "smooth"}"#,
            br#"{"image": "data:image/png;base64,AAAA", "review": ""}"#,
            br#"{"image": "data:image/png;base64,AAAA", "review": ["smooth"]}"#,
            b"not json",
            b"",
        ];

        for body in cases {
            assert!(
                matches!(validate_request(body), Err(EndpointError::BadRequest(_))),
                "受理されてしまった: {}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
