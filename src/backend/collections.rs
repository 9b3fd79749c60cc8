use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::AppConfig;

use super::BoxError;
use super::subscription::WatchDelivery;

/// Client HTTP cho document database của nền tảng cloud.
///
/// Mỗi collection (`cart`, `goods`, `chatroom`, `relationship`, `trade`,
/// `users`) là một endpoint; filter và patch đều là JSON document.
#[derive(Clone)]
pub struct Collections {
    http: reqwest::Client,
    base_url: String,
    env_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "_id")]
    id: Option<String>,
    /// Backend trả `conflict: true` khi precondition của add-unless khớp.
    #[serde(default)]
    conflict: bool,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    updated: u64,
    #[serde(default)]
    removed: u64,
}

/// Kết quả của một lần ghi có điều kiện.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created(String),
    /// Đã có document khớp filter xung đột; không ghi gì cả.
    Conflict,
}

impl Collections {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            env_id: config.env_id.clone(),
        }
    }

    fn url(&self, collection: &str, action: &str) -> String {
        format!(
            "{}/v1/envs/{}/collections/{}/{}",
            self.base_url, self.env_id, collection, action
        )
    }

    /// Truy vấn documents khớp filter (tương đương `.where(...).get()`).
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &Value,
    ) -> Result<Vec<T>, BoxError> {
        let response = self
            .http
            .post(self.url(collection, "query"))
            .json(&json!({ "query": filter }))
            .send()
            .await?
            .error_for_status()?;

        let body: QueryResponse<T> = response.json().await?;
        Ok(body.data)
    }

    /// Thêm một document mới, trả về id backend cấp.
    pub async fn add(&self, collection: &str, doc: &Value) -> Result<String, BoxError> {
        let response = self
            .http
            .post(self.url(collection, "add"))
            .json(&json!({ "data": doc }))
            .send()
            .await?
            .error_for_status()?;

        let body: AddResponse = response.json().await?;
        body.id
            .ok_or_else(|| format!("add to `{collection}` returned no document id").into())
    }

    /// Thêm document trừ khi đã có document khớp `conflict` — backend kiểm
    /// tra và ghi trong cùng một thao tác, nên hai client không thể cùng
    /// vượt qua precondition.
    pub async fn add_unless(
        &self,
        collection: &str,
        conflict: &Value,
        doc: &Value,
    ) -> Result<AddOutcome, BoxError> {
        let response = self
            .http
            .post(self.url(collection, "add"))
            .json(&json!({ "data": doc, "unless": conflict }))
            .send()
            .await?
            .error_for_status()?;

        let body: AddResponse = response.json().await?;
        if body.conflict {
            return Ok(AddOutcome::Conflict);
        }
        match body.id {
            Some(id) => Ok(AddOutcome::Created(id)),
            None => Err(format!("conditional add to `{collection}` returned no id").into()),
        }
    }

    /// Cập nhật mọi document khớp filter, trả về số document đã sửa.
    pub async fn update(
        &self,
        collection: &str,
        filter: &Value,
        patch: &Value,
    ) -> Result<u64, BoxError> {
        let response = self
            .http
            .post(self.url(collection, "update"))
            .json(&json!({ "query": filter, "data": patch }))
            .send()
            .await?
            .error_for_status()?;

        let body: MutateResponse = response.json().await?;
        Ok(body.updated)
    }

    /// Xóa mọi document khớp filter, trả về số document đã xóa.
    pub async fn remove(&self, collection: &str, filter: &Value) -> Result<u64, BoxError> {
        let response = self
            .http
            .post(self.url(collection, "remove"))
            .json(&json!({ "query": filter }))
            .send()
            .await?
            .error_for_status()?;

        let body: MutateResponse = response.json().await?;
        Ok(body.removed)
    }

    /// Long-poll thay đổi của các documents khớp filter. `cursor` là id của
    /// lần giao trước (0 cho lần đầu — backend trả snapshot `init`).
    pub async fn watch(
        &self,
        collection: &str,
        filter: &Value,
        cursor: u64,
    ) -> Result<WatchDelivery, BoxError> {
        let response = self
            .http
            .post(self.url(collection, "watch"))
            .json(&json!({ "query": filter, "cursor": cursor }))
            .send()
            .await?
            .error_for_status()?;

        let body: WatchDelivery = response.json().await?;
        Ok(body)
    }
}
