//! User profile client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, segment};
use crate::types::{NewSkill, Post, ProfileUpdate, UserProfile};
use serde_json::{Value, json};
use std::fmt::Display;

impl ApiClient {
    /// Profile of the logged-in user
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.execute(ApiRequest::get("/users/me")).await
    }

    /// A user's public profile
    pub async fn user(&self, user_id: impl Display) -> Result<UserProfile, ClientError> {
        self.execute(ApiRequest::get(format!("/users/{}", segment(user_id))))
            .await
    }

    /// Every user
    pub async fn users(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.execute(ApiRequest::get("/users")).await
    }

    /// Every user, or an empty list when the backend replies with anything
    /// other than an array
    pub async fn all_profiles(&self) -> Result<Vec<UserProfile>, ClientError> {
        match self.execute_value(ApiRequest::get("/users")).await? {
            value @ Value::Array(_) => Ok(serde_json::from_value(value)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Update the logged-in user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        self.execute(ApiRequest::put("/users/me").json(update)?).await
    }

    /// Posts authored by a user
    pub async fn user_posts(&self, user_id: impl Display) -> Result<Vec<Post>, ClientError> {
        self.execute(ApiRequest::get(format!("/posts/user/{}", segment(user_id))))
            .await
    }

    /// Point the profile picture at an already-hosted image
    pub async fn set_profile_picture(&self, avatar_url: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::post("/users/upload/profile-picture")
            .json(&json!({ "avatar_url": avatar_url }))?;
        self.execute_value(request).await
    }

    /// Point the cover image at an already-hosted image
    pub async fn set_cover_image(&self, cover_image_url: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::post("/users/upload/cover-image")
            .json(&json!({ "cover_image_url": cover_image_url }))?;
        self.execute_value(request).await
    }

    /// Attach a skill to the logged-in user's profile
    pub async fn add_profile_skill(&self, skill: &NewSkill) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::post("/users/skills").json(skill)?)
            .await
    }

    /// Remove a skill from the logged-in user's profile
    pub async fn delete_profile_skill(&self, skill_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!(
            "/users/skills/{}",
            segment(skill_id)
        )))
        .await
    }
}
