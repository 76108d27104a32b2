//! カタログ（図鑑）の永続化
//!
//! キーバリューストレージの1キーにエントリ列全体をJSONで保存する。
//! 読み込みは全件、書き込みも全件。

use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use strain_dex_common::PokedexEntry;

/// カタログを保存するキー
pub const CATALOG_KEY: &str = "pokedex-entries";

/// 永続キーバリューストレージ
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// ディレクトリ配下に `<key>.json` として保存
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        // 一時ファイルに書いてからrename（書き込み途中で壊れないように）
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// メモリ上のストレージ（テスト・一時利用）
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の値を入れた状態で作る
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.values.borrow_mut().insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// カタログ。操作は load / save のみ
#[derive(Debug)]
pub struct Catalog<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> Catalog<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 全エントリを読み込み（新しい順）
    ///
    /// 未保存・読み込み失敗・破損データはいずれも空のカタログとして扱う
    pub fn load(&self) -> Vec<PokedexEntry> {
        let content = match self.storage.get(CATALOG_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "catalog could not be read, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "catalog data is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// 全エントリを書き込み
    pub fn save(&self, entries: &[PokedexEntry]) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        self.storage.set(CATALOG_KEY, &content)?;
        tracing::debug!(count = entries.len(), "catalog saved");
        Ok(())
    }
}
