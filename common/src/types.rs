//! 図鑑エントリの型定義
//!
//! クライアントとエンドポイントで共有される型:
//! - ExtractedProductInfo: 解析エンドポイントの出力
//! - Draft: 解析済み・未保存のエントリ
//! - PokedexEntry: カタログに保存されたエントリ
//! - AnalyzeRequest / ErrorResponse: `/api/analyze` のワイヤ形式

use serde::{Deserialize, Serialize};

/// 解析結果: パッケージ画像から抽出した項目とレビューの書き直し
///
/// 6項目すべてが常に存在する。欠損の補完はエンドポイント側の責務。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProductInfo {
    pub manufacturer: String,
    pub product_name: String,
    pub strain: String,
    pub potency: String,
    pub other_details: Vec<String>,
    pub enhanced_review: String,
}

/// 未保存の下書き（id / createdAt なし）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub info: ExtractedProductInfo,
    /// 元画像のData URI
    pub image: String,
    pub original_review: String,
}

impl Draft {
    pub fn new(info: ExtractedProductInfo, image: String, original_review: String) -> Self {
        Self { info, image, original_review }
    }

    /// 保存時刻から生成したidとタイムスタンプを付与してエントリにする
    pub fn into_entry(self, id: String, created_at: String) -> PokedexEntry {
        PokedexEntry {
            id,
            created_at,
            image: self.image,
            original_review: self.original_review,
            info: self.info,
        }
    }
}

/// カタログのエントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokedexEntry {
    pub id: String,
    /// ISO-8601
    pub created_at: String,
    pub image: String,
    pub original_review: String,
    #[serde(flatten)]
    pub info: ExtractedProductInfo,
}

/// `POST /api/analyze` のリクエストボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub image: String,
    pub review: String,
}

/// エラーレスポンスのボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
