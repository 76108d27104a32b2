//! 画面遷移（一覧 / 入力フォーム / 詳細）
//!
//! ```text
//! List --add--> Form --submit(成功)--> Detail[Draft] --save--> List
//!               Form --cancel--> List  Detail[Draft] --back--> Form
//! List --select--> Detail[Persisted] --back--> List
//! ```
//!
//! 下書きと保存済みエントリの選択は同時に存在しない（型で保証）。

use crate::catalog::{Catalog, KeyValueStorage};
use crate::client::Analyzer;
use crate::error::{Result, StrainDexError};
use chrono::{DateTime, SecondsFormat, Utc};
use strain_dex_common::{Draft, ExtractedProductInfo, PokedexEntry};

/// 画像・レビュー未入力で送信した場合のメッセージ
pub const MISSING_INPUT_MESSAGE: &str = "Please provide both an image and a review.";

/// 入力フォームの状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// 選択済み画像のData URI
    pub image: Option<String>,
    pub review: String,
    /// フォーム下に表示するエラー
    pub error: Option<String>,
}

/// 詳細画面に表示する対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    /// 解析済み・未保存
    Draft(Draft),
    /// 保存済み（保存操作なし）
    Persisted(PokedexEntry),
}

impl Detail {
    pub fn info(&self) -> &ExtractedProductInfo {
        match self {
            Detail::Draft(draft) => &draft.info,
            Detail::Persisted(entry) => &entry.info,
        }
    }

    pub fn image(&self) -> &str {
        match self {
            Detail::Draft(draft) => &draft.image,
            Detail::Persisted(entry) => &entry.image,
        }
    }

    pub fn original_review(&self) -> &str {
        match self {
            Detail::Draft(draft) => &draft.original_review,
            Detail::Persisted(entry) => &entry.original_review,
        }
    }

    pub fn created_at(&self) -> Option<&str> {
        match self {
            Detail::Draft(_) => None,
            Detail::Persisted(entry) => Some(&entry.created_at),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Detail::Persisted(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    List,
    Form(FormState),
    Detail(Detail),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::List => "list",
            View::Form(_) => "form",
            View::Detail(Detail::Draft(_)) => "draft detail",
            View::Detail(Detail::Persisted(_)) => "entry detail",
        }
    }
}

/// 図鑑アプリの状態を保持し、遷移を実行する
pub struct Dex<S: KeyValueStorage, A: Analyzer> {
    catalog: Catalog<S>,
    analyzer: A,
    entries: Vec<PokedexEntry>,
    view: View,
}

impl<S: KeyValueStorage, A: Analyzer> Dex<S, A> {
    /// カタログを読み込み、一覧画面から開始
    pub fn new(catalog: Catalog<S>, analyzer: A) -> Self {
        let entries = catalog.load();
        tracing::debug!(count = entries.len(), "catalog loaded");
        Self {
            catalog,
            analyzer,
            entries,
            view: View::List,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// 保存済みエントリ（新しい順）
    pub fn entries(&self) -> &[PokedexEntry] {
        &self.entries
    }

    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    pub fn find(&self, id: &str) -> Option<&PokedexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn invalid(&self, action: &'static str) -> StrainDexError {
        StrainDexError::InvalidTransition {
            action,
            view: self.view.name(),
        }
    }

    fn form_mut(&mut self, action: &'static str) -> Result<&mut FormState> {
        let view = self.view.name();
        match &mut self.view {
            View::Form(form) => Ok(form),
            _ => Err(StrainDexError::InvalidTransition { action, view }),
        }
    }

    /// 一覧 → 入力フォーム
    pub fn add(&mut self) -> Result<()> {
        if !matches!(self.view, View::List) {
            return Err(self.invalid("add an entry"));
        }
        self.view = View::Form(FormState::default());
        Ok(())
    }

    pub fn set_image(&mut self, image: String) -> Result<()> {
        self.form_mut("attach an image")?.image = Some(image);
        Ok(())
    }

    pub fn set_review(&mut self, review: String) -> Result<()> {
        self.form_mut("edit the review")?.review = review;
        Ok(())
    }

    /// 解析を実行
    ///
    /// 成功すれば下書きの詳細画面へ。失敗時はフォームに留まり、
    /// 入力は保持したままエラーを記録する。
    pub async fn submit(&mut self) -> Result<()> {
        let form = self.form_mut("submit")?;
        let (image, review) = match (&form.image, form.review.trim().is_empty()) {
            (Some(image), false) => (image.clone(), form.review.clone()),
            _ => {
                form.error = Some(MISSING_INPUT_MESSAGE.to_string());
                return Ok(());
            }
        };
        form.error = None;

        match self.analyzer.analyze(&image, &review).await {
            Ok(info) => {
                self.view = View::Detail(Detail::Draft(Draft::new(info, image, review)));
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed");
                if let View::Form(form) = &mut self.view {
                    form.error = Some(e.to_string());
                }
            }
        }
        Ok(())
    }

    /// 入力フォーム → 一覧
    pub fn cancel(&mut self) -> Result<()> {
        if !matches!(self.view, View::Form(_)) {
            return Err(self.invalid("cancel"));
        }
        self.view = View::List;
        Ok(())
    }

    /// 下書きを保存して一覧へ
    pub fn save(&mut self) -> Result<&PokedexEntry> {
        self.save_at(Utc::now())
    }

    /// 保存時刻を指定して保存
    ///
    /// 先頭に追加した全件を書き込めた場合のみ状態を更新する。
    pub fn save_at(&mut self, now: DateTime<Utc>) -> Result<&PokedexEntry> {
        let View::Detail(Detail::Draft(draft)) = &self.view else {
            return Err(self.invalid("save"));
        };

        let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let id = unique_id(&created_at, &self.entries);
        let entry = draft.clone().into_entry(id, created_at);

        let mut entries = self.entries.clone();
        entries.insert(0, entry);
        self.catalog.save(&entries)?;

        tracing::info!(id = %entries[0].id, product = %entries[0].info.product_name, "entry saved");
        self.entries = entries;
        self.view = View::List;
        Ok(&self.entries[0])
    }

    /// 詳細 → 戻る
    ///
    /// 下書きは破棄し、画像とレビューを入れた状態のフォームへ戻る。
    /// 保存済みエントリからは一覧へ。
    pub fn back(&mut self) -> Result<()> {
        match std::mem::take(&mut self.view) {
            View::Detail(Detail::Draft(draft)) => {
                self.view = View::Form(FormState {
                    image: Some(draft.image),
                    review: draft.original_review,
                    error: None,
                });
                Ok(())
            }
            View::Detail(Detail::Persisted(_)) => {
                self.view = View::List;
                Ok(())
            }
            other => {
                self.view = other;
                Err(self.invalid("go back"))
            }
        }
    }

    /// 一覧 → 保存済みエントリの詳細
    pub fn select(&mut self, id: &str) -> Result<()> {
        if !matches!(self.view, View::List) {
            return Err(self.invalid("select an entry"));
        }
        let entry = self
            .find(id)
            .cloned()
            .ok_or_else(|| StrainDexError::EntryNotFound(id.to_string()))?;
        self.view = View::Detail(Detail::Persisted(entry));
        Ok(())
    }
}

/// 既存idと重複しないid（重複時は "-2", "-3", ... を付加）
pub fn unique_id(base: &str, entries: &[PokedexEntry]) -> String {
    let taken = |id: &str| entries.iter().any(|e| e.id == id);
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
