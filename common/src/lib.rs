//! Strain Dex Common Library
//!
//! 解析エンドポイントとクライアント（CLI）で共有される型とユーティリティ

pub mod types;
pub mod data_uri;
pub mod error;
pub mod parser;
pub mod prompts;

pub use types::{AnalyzeRequest, Draft, ErrorResponse, ExtractedProductInfo, PokedexEntry};
pub use data_uri::{
    extract_base64_from_data_url, extract_mime_type_from_data_url, InlineImage, DEFAULT_MIME_TYPE,
};
pub use error::{Error, Result};
pub use parser::{
    coerce_product_info, extract_json_object, parse_product_info, NOT_AVAILABLE,
    REVIEW_UNAVAILABLE,
};
pub use prompts::{build_analysis_prompt, response_schema, REQUIRED_FIELDS};
