//! 設定
//!
//! 優先順位: CLIフラグ > 環境変数 > `~/.config/strain-dex/config.json` > デフォルト

use crate::error::{Result, StrainDexError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// モデルAPIキー（エンドポイント側でのみ使用）
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_base_url: String,
    /// クライアントが呼び出すエンドポイントのベースURL
    pub api_url: String,
    pub bind_address: String,
    /// カタログ保存先（未指定ならプラットフォームのデータディレクトリ）
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            api_url: DEFAULT_API_URL.into(),
            bind_address: DEFAULT_BIND_ADDRESS.into(),
            data_dir: None,
        }
    }
}

impl Config {
    /// 設定ファイルと環境変数から読み込み
    pub fn load() -> Result<Self> {
        // テスト時は .env を読まない
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let config = Self::from_file(&Self::config_path()?)?;
        Ok(config.apply_env(|name| std::env::var(name).ok()))
    }

    /// 設定ファイルを読み込み（存在しなければデフォルト）
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 環境変数で上書き（空文字は未設定扱い）
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY").or_else(|| var("API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = var("STRAIN_DEX_MODEL") {
            self.model = model;
        }
        if let Some(base) = var("GEMINI_API_BASE") {
            self.gemini_base_url = base;
        }
        if let Some(url) = var("STRAIN_DEX_API_URL") {
            self.api_url = url;
        }
        if let Some(bind) = var("STRAIN_DEX_BIND") {
            self.bind_address = bind;
        }
        if let Some(dir) = var("STRAIN_DEX_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| StrainDexError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("strain-dex").join("config.json"))
    }

    /// エンドポイント起動時に必須
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(StrainDexError::MissingApiKey)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| {
            StrainDexError::Config(format!("invalid bind address '{}': {}", self.bind_address, e))
        })
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| StrainDexError::Config("data directory not found".into()))?;
        Ok(base.join("strain-dex"))
    }
}
