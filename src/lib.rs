//! Strain Dex
//!
//! パッケージ写真とレビューをAIで解析し、ローカルの図鑑に保存する
//!
//! - server: 解析エンドポイント（Gemini中継）
//! - client: エンドポイント呼び出し
//! - catalog: 図鑑の永続化
//! - view: 画面遷移

pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod image_codec;
pub mod render;
pub mod server;
pub mod shell;
pub mod view;

pub use catalog::{Catalog, FileStorage, KeyValueStorage, MemoryStorage, CATALOG_KEY};
pub use client::{AnalysisClient, Analyzer};
pub use error::{Result, StrainDexError};
pub use view::{Detail, Dex, FormState, View};
