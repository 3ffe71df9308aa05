//! Replayable request descriptions
//!
//! A request is described once and materialised into a fresh
//! `reqwest::RequestBuilder` for every attempt, so a retry picks up whatever
//! access token the store holds at that moment.

use super::error::ClientError;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Which base address a path is relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Resource API (`/users`, `/posts`, ...)
    Api(String),
    /// Auth service (`/login`, `/refresh`, ...)
    Auth(String),
}

impl Endpoint {
    pub fn path(&self) -> &str {
        match self {
            Endpoint::Api(path) | Endpoint::Auth(path) => path,
        }
    }
}

/// An outbound call routed through the authenticated pipeline
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: Endpoint,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, Endpoint::Api(path.into()))
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, Endpoint::Api(path.into()))
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, Endpoint::Api(path.into()))
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, Endpoint::Api(path.into()))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, Endpoint::Api(path.into()))
    }

    /// A request against the auth service
    pub fn auth(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, Endpoint::Auth(path.into()))
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_query_and_body() {
        let request = ApiRequest::get("/posts/search")
            .query("q", "rust")
            .query("limit", 20)
            .json(&json!({ "content": "hi" }))
            .unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.endpoint(), &Endpoint::Api("/posts/search".into()));
        assert_eq!(
            request.query_pairs(),
            &[
                ("q".to_string(), "rust".to_string()),
                ("limit".to_string(), "20".to_string())
            ]
        );
        assert_eq!(request.body(), Some(&json!({ "content": "hi" })));
    }

    #[test]
    fn auth_endpoint() {
        let request = ApiRequest::auth(Method::POST, "/logout");
        assert_eq!(request.endpoint().path(), "/logout");
        assert!(matches!(request.endpoint(), Endpoint::Auth(_)));
    }
}
