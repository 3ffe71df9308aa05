//! Notification client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, segment};
use crate::types::{Notification, Page, UnreadCount};
use serde_json::Value;
use std::fmt::Display;

impl ApiClient {
    pub async fn notifications(&self, page: Page) -> Result<Vec<Notification>, ClientError> {
        let request = ApiRequest::get("/notifications")
            .query("limit", page.limit)
            .query("offset", page.offset);
        self.execute(request).await
    }

    pub async fn unread_count(&self) -> Result<UnreadCount, ClientError> {
        self.execute(ApiRequest::get("/notifications/unread-count"))
            .await
    }

    pub async fn mark_notification_read(
        &self,
        notification_id: impl Display,
    ) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::put(format!(
            "/notifications/{}/read",
            segment(notification_id)
        )))
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::put("/notifications/mark-all-read"))
            .await
    }

    pub async fn delete_notification(
        &self,
        notification_id: impl Display,
    ) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!(
            "/notifications/{}",
            segment(notification_id)
        )))
        .await
    }
}
