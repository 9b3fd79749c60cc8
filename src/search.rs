use chrono::Utc;
use serde_json::json;

use crate::backend::{BoxError, Collections};
use crate::common::BookDetail;

/// Đăng trong vòng 5 ngày thì gắn nhãn "mới".
pub const NEW_WINDOW_MS: i64 = 432_000_000;

/// Độ dài tối đa phần giới thiệu hiện trên thẻ kết quả.
pub const INTRODUCTION_LIMIT: usize = 24;

/// Một kết quả tìm kiếm đã trang trí sẵn cho UI.
#[derive(Debug, Clone)]
pub struct GoodsListing {
    pub book: BookDetail,
    pub is_new: bool,
    /// Giới thiệu đã cắt ngắn.
    pub introduction: String,
}

/// Từ khóa toàn số thì coi là mã ISBN, còn lại tìm theo tên sách.
pub fn is_isbn_keyword(keyword: &str) -> bool {
    !keyword.is_empty() && keyword.parse::<f64>().is_ok()
}

/// Cắt phần giới thiệu còn `limit` ký tự, thêm dấu lược nếu bị cắt.
pub fn format_introduction(introduction: &str, limit: usize) -> String {
    if introduction.chars().count() > limit {
        let truncated: String = introduction.chars().take(limit).collect();
        format!("{truncated}……")
    } else {
        introduction.to_string()
    }
}

/// Trang trí một tin rao cho danh sách kết quả.
pub fn decorate(book: BookDetail, now_ms: i64) -> GoodsListing {
    let is_new = now_ms - book.post_date < NEW_WINDOW_MS;
    let introduction = format_introduction(&book.introduction, INTRODUCTION_LIMIT);
    GoodsListing {
        book,
        is_new,
        introduction,
    }
}

/// Tìm sách theo từ khóa: số → tra ISBN, chữ → tra tên.
pub async fn search_goods(
    collections: &Collections,
    keyword: &str,
) -> Result<Vec<GoodsListing>, BoxError> {
    let filter = if is_isbn_keyword(keyword) {
        json!({ "isbn": keyword })
    } else {
        json!({ "name": keyword })
    };

    let found: Vec<BookDetail> = collections.get("goods", &filter).await?;
    let now_ms = Utc::now().timestamp_millis();
    Ok(found
        .into_iter()
        .map(|book| decorate(book, now_ms))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(post_date: i64, introduction: &str) -> BookDetail {
        BookDetail {
            id: Some("g1".to_string()),
            seller_openid: "seller".to_string(),
            name: "Vật lý đại cương".to_string(),
            isbn: "9787040396638".to_string(),
            price: None,
            original_price: 40.0,
            grade: String::new(),
            college: String::new(),
            introduction: introduction.to_string(),
            post_date,
            image_list: vec![],
            state: 0,
        }
    }

    #[test]
    fn numeric_keyword_routes_to_isbn() {
        assert!(is_isbn_keyword("9787040396638"));
        assert!(!is_isbn_keyword("giải tích"));
        assert!(!is_isbn_keyword(""));
    }

    #[test]
    fn short_introduction_is_untouched() {
        assert_eq!(format_introduction("ngắn gọn", 24), "ngắn gọn");
    }

    #[test]
    fn long_introduction_is_truncated_with_ellipsis() {
        let long = "a".repeat(30);
        let formatted = format_introduction(&long, 24);

        assert!(formatted.ends_with("……"));
        assert_eq!(formatted.chars().count(), 24 + 2);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        // 30 ký tự nhiều byte, không được cắt giữa ký tự.
        let long = "sách".repeat(10);
        let formatted = format_introduction(&long, 24);
        assert_eq!(formatted.chars().count(), 26);
    }

    #[test]
    fn recent_post_is_marked_new() {
        let now = 1_000_000_000_000;
        let listing = decorate(book(now - NEW_WINDOW_MS + 1, ""), now);
        assert!(listing.is_new);
    }

    #[test]
    fn old_post_is_not_new() {
        let now = 1_000_000_000_000;
        let listing = decorate(book(now - NEW_WINDOW_MS - 1, ""), now);
        assert!(!listing.is_new);
    }
}
