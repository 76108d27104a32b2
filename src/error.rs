use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrainDexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GEMINI_API_KEY is not set. Export GEMINI_API_KEY (or API_KEY) before running `strain-dex serve`")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    /// 解析失敗（メッセージはそのままユーザーに表示する）
    #[error("{0}")]
    Analysis(String),

    #[error("Model call failed: {0}")]
    Model(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Cannot {action} from the {view} view")]
    InvalidTransition {
        action: &'static str,
        view: &'static str,
    },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] strain_dex_common::Error),
}

pub type Result<T> = std::result::Result<T, StrainDexError>;
