use serde::Deserialize;
use serde_json::{Value, json};

use crate::common::BookInfo;
use crate::config::AppConfig;

use super::BoxError;

/// Client gọi cloud function theo tên (tương đương `wx.cloud.callFunction`).
#[derive(Clone)]
pub struct Functions {
    http: reqwest::Client,
    base_url: String,
    env_id: String,
}

#[derive(Debug, Deserialize)]
struct FunctionResponse {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct OpenidResult {
    openid: String,
}

impl Functions {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            env_id: config.env_id.clone(),
        }
    }

    async fn call(&self, name: &str, payload: &Value) -> Result<Value, BoxError> {
        let url = format!("{}/v1/envs/{}/functions/{}", self.base_url, self.env_id, name);
        let response = self
            .http
            .post(url)
            .json(&json!({ "data": payload }))
            .send()
            .await?
            .error_for_status()?;

        let body: FunctionResponse = response.json().await?;
        Ok(body.result)
    }

    /// Lấy openid của người dùng đang đăng nhập.
    pub async fn get_openid(&self) -> Result<String, BoxError> {
        let result = self.call("getOpenid", &json!({})).await?;
        let parsed: OpenidResult = serde_json::from_value(result)?;
        Ok(parsed.openid)
    }

    /// Tra cứu thông tin sách theo mã ISBN.
    pub async fn get_book_info(&self, isbn: &str) -> Result<BookInfo, BoxError> {
        let result = self.call("getBookInfo", &json!({ "isbn": isbn })).await?;
        // Function gốc trả về chuỗi JSON, không phải object.
        let info: BookInfo = match result {
            Value::String(raw) => serde_json::from_str(&raw)?,
            other => serde_json::from_value(other)?,
        };
        Ok(info)
    }

    /// Đổi `state` của một tin rao (0 = đang bán, 1 = đã đặt).
    pub async fn update_goods_state(&self, goods_id: &str, state: i64) -> Result<(), BoxError> {
        self.call(
            "updateGoods",
            &json!({
                "type": "updateState",
                "goodsID": goods_id,
                "state": state,
            }),
        )
        .await?;
        Ok(())
    }
}
