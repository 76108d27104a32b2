//! Data URI処理
//!
//! "data:image/jpeg;base64,/9j/4AAQ..." 形式の文字列と
//! (MIMEタイプ, Base64ペイロード) の相互変換

use base64::{engine::general_purpose::STANDARD, Engine};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

/// プレフィックスからMIMEタイプを読み取れない場合のデフォルト
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

lazy_static! {
    static ref DATA_URI_PREFIX: Regex = Regex::new(r"^data:([^;,]+)[^,]*;base64,").unwrap();
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出
///
/// # Returns
/// MIMEタイプ（例: "image/png"）、抽出失敗時は"image/jpeg"
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    DATA_URI_PREFIX
        .captures(data_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// 分解済みのインライン画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64ペイロード（プレフィックスなし）
    pub data: String,
}

impl InlineImage {
    /// Data URIを分解する。ペイロードが無い場合はエラー
    pub fn parse(data_url: &str) -> Result<Self> {
        let data = extract_base64_from_data_url(data_url)
            .filter(|payload| !payload.is_empty())
            .ok_or_else(|| Error::InvalidDataUri("base64 payload not found".into()))?;

        Ok(Self {
            mime_type: extract_mime_type_from_data_url(data_url).to_string(),
            data: data.to_string(),
        })
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// ペイロードをバイト列に戻す
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.data.trim())?)
    }

    /// デコード後のおおよそのバイト数（デコードせずに計算）
    pub fn decoded_len(&self) -> usize {
        let payload = self.data.trim();
        let padding = payload.chars().rev().take_while(|&c| c == '=').count();
        ((payload.len() / 4) * 3).saturating_sub(padding.min(2))
    }
}
