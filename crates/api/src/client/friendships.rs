//! Friendship graph client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, segment};
use crate::types::{Connections, FriendRequest, FriendshipStatus, Id, Page, UserProfile};
use serde_json::Value;
use std::fmt::Display;

impl ApiClient {
    /// The logged-in user's connections, accepted and pending
    pub async fn friendships(&self) -> Result<Connections, ClientError> {
        self.execute(ApiRequest::get("/friendships")).await
    }

    pub async fn send_friend_request(&self, to_user_id: &Id) -> Result<Value, ClientError> {
        let request = ApiRequest::post("/friendships/request").json(&FriendRequest { to_user_id })?;
        self.execute_value(request).await
    }

    /// Pending requests addressed to the logged-in user
    pub async fn incoming_requests(&self) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::get("/friendships/requests/incoming"))
            .await
    }

    /// Pending requests sent by the logged-in user
    pub async fn outgoing_requests(&self) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::get("/friendships/requests/outgoing"))
            .await
    }

    pub async fn accept_friend_request(&self, from_user_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::patch(format!(
            "/friendships/requests/{}/accept",
            segment(from_user_id)
        )))
        .await
    }

    pub async fn reject_friend_request(&self, from_user_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::patch(format!(
            "/friendships/requests/{}/reject",
            segment(from_user_id)
        )))
        .await
    }

    /// Remove a friendship or cancel a pending request
    pub async fn unfriend(&self, other_user_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!(
            "/friendships/{}",
            segment(other_user_id)
        )))
        .await
    }

    pub async fn friend_suggestions(&self, page: Page) -> Result<Vec<UserProfile>, ClientError> {
        let request = ApiRequest::get("/friendships/suggestions")
            .query("limit", page.limit)
            .query("offset", page.offset);
        self.execute(request).await
    }

    pub async fn friendship_status(
        &self,
        other_user_id: impl Display,
    ) -> Result<FriendshipStatus, ClientError> {
        self.execute(ApiRequest::get(format!(
            "/friendships/status/{}",
            segment(other_user_id)
        )))
        .await
    }
}
