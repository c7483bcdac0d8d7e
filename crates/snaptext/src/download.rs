//! Plain-text download documents and their attachment filenames.

use chrono::{DateTime, Utc};

use crate::types::{BatchResult, ExtractionResult};
use crate::{Result, SnaptextError};

pub const NOT_FOUND_MESSAGE: &str = "No extracted text found.";

const RULE: &str = "==================================================";

/// A rendered download: filename plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDownload {
    pub filename: String,
    pub body: String,
}

/// Reduce a client-supplied filename to something safe for a `Content-Disposition`
/// header: ASCII letters, digits, `.`, `_` and `-`; whitespace becomes `_`; leading dots
/// and underscores are dropped.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

fn file_stem(filename: &str) -> String {
    let safe = secure_filename(filename);
    let stem = match safe.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => safe,
    };
    if stem.is_empty() { "image".to_string() } else { stem }
}

pub fn single_download_filename(filename: &str) -> String {
    format!("extracted_text_{}.txt", file_stem(filename))
}

pub fn all_download_filename(now: DateTime<Utc>) -> String {
    format!("all_extracted_texts_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Header block written before each entry of the combined download.
pub fn entry_header(ordinal: usize, result: &ExtractionResult) -> String {
    format!(
        "{RULE}\nFile {}: {}\nCharacters: {}\nSize: {} bytes\n{RULE}\n",
        ordinal,
        result.filename,
        result.char_count(),
        result.size_bytes
    )
}

/// One entry of a stored batch.
///
/// # Errors
///
/// `SnaptextError::NotFound` if there is no batch or `index` is out of range.
pub fn render_single(batch: Option<&BatchResult>, index: usize) -> Result<TextDownload> {
    let result = batch
        .and_then(|b| b.get(index))
        .ok_or_else(|| SnaptextError::not_found(NOT_FOUND_MESSAGE))?;

    Ok(TextDownload {
        filename: single_download_filename(&result.filename),
        body: result.text.clone(),
    })
}

/// Every entry of a stored batch, in order, each preceded by its header block.
///
/// # Errors
///
/// `SnaptextError::NotFound` if there is no batch.
pub fn render_all(batch: Option<&BatchResult>, now: DateTime<Utc>) -> Result<TextDownload> {
    let batch = batch.ok_or_else(|| SnaptextError::not_found(NOT_FOUND_MESSAGE))?;

    let mut body = String::new();
    for (i, result) in batch.iter().enumerate() {
        body.push_str(&entry_header(i + 1, result));
        body.push('\n');
        body.push_str(&result.text);
        body.push_str("\n\n");
    }

    Ok(TextDownload {
        filename: all_download_filename(now),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn batch() -> BatchResult {
        vec![
            ExtractionResult::from_text("first.png", 100, "alpha"),
            ExtractionResult::from_text("second.jpg", 2048, "beta gamma"),
            ExtractionResult::error("third.gif", 7, "engine failed"),
        ]
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("my scan.png"), "my_scan.png");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\shot.PNG"), "shot.PNG");
        assert_eq!(secure_filename(".hidden.png"), "hidden.png");
        assert_eq!(secure_filename("résumé.png"), "rsum.png");
    }

    #[test]
    fn test_single_download_filename() {
        assert_eq!(single_download_filename("receipt.png"), "extracted_text_receipt.txt");
        assert_eq!(single_download_filename("a.b.jpeg"), "extracted_text_a.b.txt");
        assert_eq!(single_download_filename("???"), "extracted_text_image.txt");
    }

    #[test]
    fn test_entry_header_layout() {
        let header = entry_header(2, &ExtractionResult::from_text("second.jpg", 2048, "beta gamma"));
        let rule = "=".repeat(50);
        assert_eq!(
            header,
            format!("{rule}\nFile 2: second.jpg\nCharacters: 10\nSize: 2048 bytes\n{rule}\n")
        );
    }

    #[test]
    fn test_render_single_in_range() {
        let batch = batch();
        let download = render_single(Some(&batch), 1).unwrap();
        assert_eq!(download.body, "beta gamma");
        assert_eq!(download.filename, "extracted_text_second.txt");
    }

    #[test]
    fn test_render_single_out_of_range() {
        let batch = batch();
        let err = render_single(Some(&batch), 5).unwrap_err();
        assert!(matches!(err, SnaptextError::NotFound(_)));
    }

    #[test]
    fn test_render_single_without_batch() {
        assert!(matches!(render_single(None, 0), Err(SnaptextError::NotFound(_))));
    }

    #[test]
    fn test_render_all_preserves_order_and_headers() {
        let batch = batch();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let download = render_all(Some(&batch), now).unwrap();

        assert_eq!(download.filename, "all_extracted_texts_20240309_140507.txt");

        let first = download.body.find("File 1: first.png").unwrap();
        let second = download.body.find("File 2: second.jpg").unwrap();
        let third = download.body.find("File 3: third.gif").unwrap();
        assert!(first < second && second < third);

        assert!(download.body.contains("Characters: 5\nSize: 100 bytes"));
        assert!(download.body.contains("Characters: 10\nSize: 2048 bytes"));
        assert!(download.body.contains("Error processing image: engine failed"));
    }

    #[test]
    fn test_render_all_without_batch() {
        assert!(matches!(render_all(None, Utc::now()), Err(SnaptextError::NotFound(_))));
    }
}
