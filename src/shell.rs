//! 対話式の図鑑操作
//!
//! 画面状態は view::Dex が持ち、ここは入力と表示だけを担当する。

use crate::catalog::KeyValueStorage;
use crate::client::Analyzer;
use crate::error::{Result, StrainDexError};
use crate::image_codec;
use crate::render::{entry_label, render_detail, render_list};
use crate::view::{Dex, Detail, View};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// 解析中のスピナー
pub fn analysis_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Analyzing product...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// 解析を実行（完了までスピナー表示、その間は入力を受け付けない）
pub async fn submit_with_spinner<S: KeyValueStorage, A: Analyzer>(dex: &mut Dex<S, A>) -> Result<()> {
    let spinner = analysis_spinner();
    let result = dex.submit().await;
    spinner.finish_and_clear();
    result
}

fn select(prompt: &str, items: &[String]) -> Result<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(|e| StrainDexError::Prompt(e.to_string()))
}

/// 図鑑の対話ループ（一覧で Quit を選ぶまで）
pub async fn run<S: KeyValueStorage, A: Analyzer>(dex: &mut Dex<S, A>) -> Result<()> {
    println!("🌿 Strain Dex - Your AI-Powered Cannabis Catalog\n");

    loop {
        match dex.view().clone() {
            View::List => {
                if !list_screen(dex)? {
                    break;
                }
            }
            View::Form(_) => form_screen(dex).await?,
            View::Detail(detail) => detail_screen(dex, &detail)?,
        }
    }

    Ok(())
}

/// 一覧画面。false を返したら終了
fn list_screen<S: KeyValueStorage, A: Analyzer>(dex: &mut Dex<S, A>) -> Result<bool> {
    println!("{}", render_list(dex.entries()));

    let mut items = vec!["New Entry".to_string()];
    items.extend(dex.entries().iter().map(entry_label));
    items.push("Quit".to_string());

    let choice = select("Strain Dex", &items)?;
    if choice == 0 {
        dex.add()?;
    } else if choice == items.len() - 1 {
        return Ok(false);
    } else {
        let id = dex.entries()[choice - 1].id.clone();
        dex.select(&id)?;
    }
    Ok(true)
}

async fn form_screen<S: KeyValueStorage, A: Analyzer>(dex: &mut Dex<S, A>) -> Result<()> {
    println!("\n📝 Log a New Entry");
    println!("Upload an image and describe your experience. (PNG, JPG, GIF up to 10MB)\n");

    let (has_image, review, error) = match dex.view() {
        View::Form(form) => (form.image.is_some(), form.review.clone(), form.error.clone()),
        _ => return Ok(()),
    };
    if let Some(error) = error {
        println!("✖ {}\n", error);
    }

    let path_prompt = if has_image {
        "Product image path (empty keeps current image)"
    } else {
        "Product image path"
    };
    let path: String = Input::new()
        .with_prompt(path_prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| StrainDexError::Prompt(e.to_string()))?;

    let path = path.trim();
    if !path.is_empty() {
        match image_codec::encode_file(&PathBuf::from(path)).await {
            Ok(data_uri) => dex.set_image(data_uri)?,
            Err(e) => println!("✖ Could not read image: {}", e),
        }
    }

    let review: String = Input::new()
        .with_prompt("Your experience")
        .with_initial_text(review)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| StrainDexError::Prompt(e.to_string()))?;
    dex.set_review(review)?;

    let actions = vec!["Analyze".to_string(), "Cancel".to_string()];
    match select("Next", &actions)? {
        0 => submit_with_spinner(dex).await?,
        _ => dex.cancel()?,
    }
    Ok(())
}

fn detail_screen<S: KeyValueStorage, A: Analyzer>(dex: &mut Dex<S, A>, detail: &Detail) -> Result<()> {
    println!("\n{}", render_detail(detail));

    let actions = if detail.is_saved() {
        vec!["Back".to_string()]
    } else {
        vec!["Save to Dex".to_string(), "Back".to_string()]
    };

    let choice = select("Action", &actions)?;
    if !detail.is_saved() && choice == 0 {
        save_draft(dex);
    } else {
        dex.back()?;
    }
    Ok(())
}

/// 下書きを保存して結果を表示
///
/// 失敗しても下書きの詳細画面に留まる。保存できたら true
pub fn save_draft<S: KeyValueStorage, A: Analyzer>(dex: &mut Dex<S, A>) -> bool {
    match dex.save() {
        Ok(entry) => {
            println!("✔ Saved: {}", entry_label(entry));
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "entry could not be saved");
            println!("✖ Could not save: {}", e);
            false
        }
    }
}
