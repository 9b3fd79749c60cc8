use futures::future::try_join_all;
use serde_json::json;

use crate::backend::{BoxError, Collections};
use crate::common::{BookDetail, CartItem};

/// Một dòng giỏ hàng đã ghép với thông tin sách; sách có thể đã bị gỡ.
#[derive(Debug, Clone)]
pub struct CartEntry {
    pub item: CartItem,
    pub book_detail: Option<BookDetail>,
}

/// Ghép từng dòng giỏ với thông tin sách tra được theo cùng thứ tự.
pub fn join_cart_details(
    items: Vec<CartItem>,
    details: Vec<Option<BookDetail>>,
) -> Vec<CartEntry> {
    items
        .into_iter()
        .zip(details)
        .map(|(item, book_detail)| CartEntry { item, book_detail })
        .collect()
}

/// Lấy toàn bộ giỏ hàng của một người dùng, kèm thông tin sách.
pub async fn cart_entries(
    collections: &Collections,
    openid: &str,
) -> Result<Vec<CartEntry>, BoxError> {
    let items: Vec<CartItem> = collections
        .get("cart", &json!({ "_openid": openid }))
        .await?;

    // Tra thông tin từng cuốn song song, như Promise.all của trang gốc.
    let lookups = items.iter().map(|item| {
        let filter = json!({ "_id": item.goods_id });
        async move { collections.get::<BookDetail>("goods", &filter).await }
    });
    let details = try_join_all(lookups)
        .await?
        .into_iter()
        .map(|mut found| {
            if found.is_empty() {
                None
            } else {
                Some(found.swap_remove(0))
            }
        })
        .collect();

    Ok(join_cart_details(items, details))
}

/// Bỏ một dòng khỏi giỏ theo id của dòng đó.
pub async fn remove_entry(collections: &Collections, entry_id: &str) -> Result<(), BoxError> {
    collections
        .remove("cart", &json!({ "_id": entry_id }))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, goods_id: &str) -> CartItem {
        CartItem {
            id: Some(id.to_string()),
            owner_openid: "me".to_string(),
            goods_id: goods_id.to_string(),
        }
    }

    fn book(id: &str) -> BookDetail {
        BookDetail {
            id: Some(id.to_string()),
            seller_openid: "seller".to_string(),
            name: "Đại số tuyến tính".to_string(),
            isbn: "9787040396638".to_string(),
            price: Some(12.0),
            original_price: 30.0,
            grade: String::new(),
            college: String::new(),
            introduction: String::new(),
            post_date: 0,
            image_list: vec![],
            state: 0,
        }
    }

    #[test]
    fn join_keeps_item_order() {
        let entries = join_cart_details(
            vec![item("c1", "g1"), item("c2", "g2")],
            vec![Some(book("g1")), Some(book("g2"))],
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item.goods_id, "g1");
        assert_eq!(
            entries[1].book_detail.as_ref().unwrap().id.as_deref(),
            Some("g2")
        );
    }

    #[test]
    fn missing_goods_leaves_entry_without_detail() {
        let entries =
            join_cart_details(vec![item("c1", "gone")], vec![None]);

        assert_eq!(entries.len(), 1);
        assert!(entries[0].book_detail.is_none());
    }
}
