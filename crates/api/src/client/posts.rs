//! Feed, post and comment client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, segment};
use crate::types::{Comment, ContentBody, NewPost, Post};
use serde_json::Value;
use std::fmt::Display;

/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

impl ApiClient {
    /// The feed
    pub async fn posts(&self) -> Result<Vec<Post>, ClientError> {
        self.execute(ApiRequest::get("/posts")).await
    }

    /// Publish a post
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
        self.execute(ApiRequest::post("/posts").json(post)?).await
    }

    pub async fn delete_post(&self, post_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!("/posts/{}", segment(post_id))))
            .await
    }

    pub async fn comments(&self, post_id: impl Display) -> Result<Vec<Comment>, ClientError> {
        self.execute(ApiRequest::get(format!(
            "/posts/{}/comments",
            segment(post_id)
        )))
        .await
    }

    pub async fn add_comment(
        &self,
        post_id: impl Display,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let request = ApiRequest::post(format!("/posts/{}/comment", segment(post_id)))
            .json(&ContentBody { content })?;
        self.execute(request).await
    }

    /// Reply to an existing comment
    pub async fn reply_to_comment(
        &self,
        comment_id: impl Display,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let request = ApiRequest::post(format!("/comments/{}/replies", segment(comment_id)))
            .json(&ContentBody { content })?;
        self.execute(request).await
    }

    pub async fn delete_comment(&self, comment_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!(
            "/comments/{}",
            segment(comment_id)
        )))
        .await
    }

    pub async fn like_post(&self, post_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::post(format!("/posts/{}/like", segment(post_id))))
            .await
    }

    pub async fn unlike_post(&self, post_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!(
            "/posts/{}/like",
            segment(post_id)
        )))
        .await
    }

    pub async fn share_post(&self, post_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::post(format!("/posts/{}/share", segment(post_id))))
            .await
    }

    /// Count a view of a post
    pub async fn record_view(&self, post_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::post(format!("/posts/{}/view", segment(post_id))))
            .await
    }

    /// Full-text search over posts
    pub async fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<Post>, ClientError> {
        let request = ApiRequest::get("/posts/search")
            .query("q", query)
            .query("limit", limit);
        self.execute(request).await
    }
}
