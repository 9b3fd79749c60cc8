use serde_json::json;

use crate::backend::{AddOutcome, BoxError, Collections, Functions};
use crate::common::{BookDetail, TradeRecord};

/// Ảnh rác sinh ra khi người bán không upload đủ ảnh.
const PLACEHOLDER_IMAGE_SUFFIX: &str = "/undefined.jpg";

/// Thông tin người mua điền khi đặt sách.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub book: BookDetail,
    pub trade_time: String,
    pub trade_spot: String,
}

/// Kết quả đặt sách.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// Đã ghi yêu cầu giao dịch và chuyển tin rao sang "đã đặt".
    Booked,
    /// Người khác đặt trước — backend từ chối ghi.
    AlreadyBooked,
}

/// Sách đã có người đặt khi còn yêu cầu giao dịch đang chờ (state 0).
pub fn has_open_booking(existing: &[TradeRecord]) -> bool {
    existing.iter().any(|trade| trade.state == 0)
}

/// Bỏ các ảnh placeholder khỏi danh sách ảnh trước khi ghi giao dịch.
pub fn strip_placeholder_images(image_list: &mut Vec<String>) {
    image_list.retain(|url| !url.ends_with(PLACEHOLDER_IMAGE_SUFFIX));
}

/// Đặt mua một cuốn sách.
///
/// Bản gốc đọc collection `trade` rồi mới quyết định ghi, nên hai người mua
/// có thể cùng vượt qua bước kiểm tra. Ở đây điều kiện "chưa ai đặt" đi kèm
/// ngay trong lệnh ghi (`add_unless`), để backend phân xử trong một thao tác.
pub async fn launch_trade(
    collections: &Collections,
    functions: &Functions,
    request: &BookingRequest,
) -> Result<BookingOutcome, BoxError> {
    let book = &request.book;
    let goods_id = book
        .id
        .as_deref()
        .ok_or("book detail is missing its goods id")?;
    let price = book.price.ok_or("trade price must not be empty")?;

    let mut image_list = book.image_list.clone();
    strip_placeholder_images(&mut image_list);

    let record = TradeRecord {
        id: None,
        goods_id: goods_id.to_string(),
        state: 0,
        trade_price: price,
        trade_time: request.trade_time.clone(),
        trade_spot: request.trade_spot.clone(),
        original_price: book.original_price,
        seller_openid: book.seller_openid.clone(),
        grade: book.grade.clone(),
        college: book.college.clone(),
        name: book.name.clone(),
        isbn: book.isbn.clone(),
        image_list,
    };

    let conflict = json!({ "goods_id": goods_id, "state": 0 });
    let outcome = collections
        .add_unless("trade", &conflict, &serde_json::to_value(&record)?)
        .await?;

    match outcome {
        AddOutcome::Conflict => Ok(BookingOutcome::AlreadyBooked),
        AddOutcome::Created(_) => {
            // Đặt xong thì đánh dấu tin rao là "đã đặt" để các trang
            // danh sách không hiện nút mua nữa.
            functions.update_goods_state(goods_id, 1).await?;
            Ok(BookingOutcome::Booked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(state: i64) -> TradeRecord {
        TradeRecord {
            id: None,
            goods_id: "g1".to_string(),
            state,
            trade_price: 10.0,
            trade_time: "2026/8/29".to_string(),
            trade_spot: "thư viện".to_string(),
            original_price: 25.0,
            seller_openid: "seller".to_string(),
            grade: String::new(),
            college: String::new(),
            name: "Giải tích 1".to_string(),
            isbn: "9787040396638".to_string(),
            image_list: vec![],
        }
    }

    #[test]
    fn no_records_means_no_booking() {
        assert!(!has_open_booking(&[]));
    }

    #[test]
    fn pending_record_blocks_booking() {
        assert!(has_open_booking(&[trade(1), trade(0)]));
    }

    #[test]
    fn settled_records_do_not_block() {
        assert!(!has_open_booking(&[trade(1), trade(2)]));
    }

    #[test]
    fn placeholder_images_are_stripped() {
        let mut images = vec![
            "cloud://env-id/books/cover.jpg".to_string(),
            "cloud://env-id/undefined.jpg".to_string(),
            "cloud://env-id/books/back.jpg".to_string(),
        ];

        strip_placeholder_images(&mut images);

        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|url| !url.ends_with("/undefined.jpg")));
    }

    #[test]
    fn real_images_survive_stripping() {
        let mut images = vec!["cloud://env-id/books/cover.jpg".to_string()];
        strip_placeholder_images(&mut images);
        assert_eq!(images.len(), 1);
    }
}
