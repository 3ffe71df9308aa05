//! Skill catalogue client methods

use super::error::ClientError;
use super::request::ApiRequest;
use super::{ApiClient, segment};
use crate::types::{NewSkill, Skill};
use serde_json::Value;
use std::fmt::Display;

impl ApiClient {
    pub async fn my_skills(&self) -> Result<Vec<Skill>, ClientError> {
        self.execute(ApiRequest::get("/skills/me")).await
    }

    pub async fn user_skills(&self, user_id: impl Display) -> Result<Vec<Skill>, ClientError> {
        self.execute(ApiRequest::get(format!("/skills/user/{}", segment(user_id))))
            .await
    }

    pub async fn add_skill(&self, skill: &NewSkill) -> Result<Skill, ClientError> {
        self.execute(ApiRequest::post("/skills").json(skill)?).await
    }

    pub async fn update_skill(
        &self,
        skill_id: impl Display,
        skill: &NewSkill,
    ) -> Result<Skill, ClientError> {
        let request = ApiRequest::put(format!("/skills/{}", segment(skill_id))).json(skill)?;
        self.execute(request).await
    }

    pub async fn delete_skill(&self, skill_id: impl Display) -> Result<Value, ClientError> {
        self.execute_value(ApiRequest::delete(format!("/skills/{}", segment(skill_id))))
            .await
    }
}
