use std::sync::OnceLock;

use regex::Regex;

use crate::backend::{BoxError, Functions};
use crate::common::BookInfo;

fn isbn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ISBN-10 (chữ số cuối có thể là X) hoặc ISBN-13.
    PATTERN.get_or_init(|| Regex::new(r"^(?:\d{9}[\dXx]|\d{13})$").expect("valid ISBN regex"))
}

/// Mã quét có đúng dạng ISBN-10/13 không.
pub fn is_valid_isbn(code: &str) -> bool {
    isbn_pattern().is_match(code)
}

/// Tra thông tin sách từ mã vừa quét, sau khi kiểm tra dạng mã.
pub async fn scan_lookup(functions: &Functions, code: &str) -> Result<BookInfo, BoxError> {
    if !is_valid_isbn(code) {
        return Err(format!("`{code}` is not a valid ISBN").into());
    }
    functions.get_book_info(code).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_isbn_13() {
        assert!(is_valid_isbn("9787040396638"));
    }

    #[test]
    fn accepts_isbn_10_with_check_x() {
        assert!(is_valid_isbn("043942089X"));
        assert!(is_valid_isbn("043942089x"));
    }

    #[test]
    fn rejects_wrong_lengths_and_garbage() {
        assert!(!is_valid_isbn(""));
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("97870403966380"));
        assert!(!is_valid_isbn("isbn-not-a-code"));
        assert!(!is_valid_isbn("978704039663X"));
    }
}
