//! 端末向け表示
//!
//! 一覧（カードのグリッド）と詳細画面を文字列として組み立てる

use crate::view::Detail;
use strain_dex_common::{InlineImage, PokedexEntry};

/// 1行あたりのカード数
pub const GRID_COLUMNS: usize = 3;

/// カード幅（文字数）
pub const CARD_WIDTH: usize = 26;

pub const EMPTY_TITLE: &str = "Your Strain Dex is empty.";
pub const EMPTY_HINT: &str = "Choose \"New Entry\" to add your first product!";

/// 一覧画面
pub fn render_list(entries: &[PokedexEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n{}\n", EMPTY_TITLE, EMPTY_HINT);
    }

    let border = format!("+{}+", "-".repeat(CARD_WIDTH + 2));
    let mut out = String::new();

    for (row_idx, row) in entries.chunks(GRID_COLUMNS).enumerate() {
        let borders = vec![border.as_str(); row.len()].join(" ");
        let titles = row
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let number = row_idx * GRID_COLUMNS + i + 1;
                card_line(&format!("{}. {}", number, e.info.product_name))
            })
            .collect::<Vec<_>>()
            .join(" ");
        let strains = row
            .iter()
            .map(|e| card_line(&e.info.strain))
            .collect::<Vec<_>>()
            .join(" ");

        out.push_str(&borders);
        out.push('\n');
        out.push_str(&titles);
        out.push('\n');
        out.push_str(&strains);
        out.push('\n');
        out.push_str(&borders);
        out.push('\n');
    }

    out
}

fn card_line(text: &str) -> String {
    let text = truncate(text, CARD_WIDTH);
    let pad = CARD_WIDTH - text.chars().count();
    format!("| {}{} |", text, " ".repeat(pad))
}

/// 文字数で切り詰め（超える場合は末尾を "…" に）
pub fn truncate(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// 選択肢用のラベル
pub fn entry_label(entry: &PokedexEntry) -> String {
    format!("{} ({})", entry.info.product_name, entry.info.strain)
}

/// 画像の概要（端末では画像そのものは表示しない）
pub fn describe_image(data_uri: &str) -> String {
    match InlineImage::parse(data_uri) {
        Ok(image) => format!("{}, {}", image.mime_type, format_size(image.decoded_len())),
        Err(_) => "unavailable".to_string(),
    }
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// 詳細画面
pub fn render_detail(detail: &Detail) -> String {
    let info = detail.info();
    let mut out = String::new();

    out.push_str(&format!("{}\n", info.product_name));
    out.push_str(&format!("{}\n\n", info.strain));

    push_row(&mut out, "Image", &describe_image(detail.image()));
    push_row(&mut out, "Manufacturer", &info.manufacturer);
    push_row(&mut out, "Potency", &info.potency);
    if !info.other_details.is_empty() {
        out.push_str("Other Details\n");
        for item in &info.other_details {
            out.push_str(&format!("  • {}\n", item));
        }
    }
    if let Some(created_at) = detail.created_at() {
        push_row(&mut out, "Saved", created_at);
    }

    out.push_str("\nYour Review\n");
    out.push_str(&indent(detail.original_review()));
    out.push_str("\nAI Enhanced Review\n");
    out.push_str(&indent(&info.enhanced_review));

    if !detail.is_saved() {
        out.push_str("\n(not saved yet)\n");
    }

    out
}

fn push_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{:<14}{}\n", label, value));
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {}\n", line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strain_dex_common::{Draft, ExtractedProductInfo};

    fn info(name: &str, strain: &str, other_details: Vec<&str>) -> ExtractedProductInfo {
        ExtractedProductInfo {
            manufacturer: "Acme".to_string(),
            product_name: name.to_string(),
            strain: strain.to_string(),
            potency: "22% THC".to_string(),
            other_details: other_details.into_iter().map(String::from).collect(),
            enhanced_review: "A velvety, tranquil experience.".to_string(),
        }
    }

    fn entry(id: &str, name: &str, strain: &str) -> PokedexEntry {
        Draft::new(info(name, strain, vec![]), "data:image/png;base64,AAAA".into(), "ok".into())
            .into_entry(id.to_string(), "2026-01-01T00:00:00.000Z".to_string())
    }

    #[test]
    fn test_render_empty_list() {
        let out = render_list(&[]);
        assert!(out.contains(EMPTY_TITLE));
        assert!(out.contains("New Entry"));
    }

    #[test]
    fn test_render_list_grid() {
        let entries: Vec<PokedexEntry> = (1..=4)
            .map(|i| entry(&format!("id-{}", i), &format!("Product {}", i), "Blue Dream"))
            .collect();
        let out = render_list(&entries);

        // 3列 + 1列の2行 → カード行は各4行
        assert_eq!(out.lines().count(), 8);
        assert!(out.lines().nth(1).unwrap().contains("1. Product 1"));
        assert!(out.lines().nth(1).unwrap().contains("3. Product 3"));
        assert!(out.lines().nth(5).unwrap().contains("4. Product 4"));
        assert!(out.contains("Blue Dream"));
    }

    #[test]
    fn test_card_lines_have_equal_width() {
        let entries = vec![entry("a", "An extremely long product name that overflows", "Kush")];
        let out = render_list(&entries);
        let widths: Vec<usize> = out.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "{:?}", widths);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ブルードリーム", 4), "ブルー…");
    }

    #[test]
    fn test_describe_image() {
        assert_eq!(describe_image("data:image/png;base64,AAAA"), "image/png, 3 B");
        assert_eq!(describe_image("nope"), "unavailable");
    }

    #[test]
    fn test_render_draft_detail() {
        let draft = Draft::new(
            info("Blue Dream 1g", "Blue Dream", vec!["1g", "Lot 42"]),
            "data:image/png;base64,AAAA".into(),
            "smooth and relaxing".into(),
        );
        let out = render_detail(&Detail::Draft(draft));

        assert!(out.starts_with("Blue Dream 1g\nBlue Dream\n"));
        assert!(out.contains("Manufacturer  Acme"));
        assert!(out.contains("Potency       22% THC"));
        assert!(out.contains("  • Lot 42"));
        assert!(out.contains("Your Review\n  smooth and relaxing"));
        assert!(out.contains("AI Enhanced Review\n  A velvety, tranquil experience."));
        assert!(out.contains("(not saved yet)"));
    }

    #[test]
    fn test_render_saved_detail_without_other_details() {
        let out = render_detail(&Detail::Persisted(entry("id-1", "OG", "OG Kush")));
        assert!(!out.contains("Other Details"));
        assert!(out.contains("Saved         2026-01-01T00:00:00.000Z"));
        assert!(!out.contains("not saved"));
    }
}
