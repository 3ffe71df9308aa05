//! Client library for the SkillSwap social network backend
//!
//! [`ApiClient`] wraps the REST API with bearer-token authentication and
//! transparent session renewal. Tokens and the theme preference live in a
//! [`SessionStore`]; session expiry is reported through
//! [`ApiClient::subscribe`] instead of any navigation side effect.

pub mod client;
pub mod config;
pub mod session;
pub mod theme;
pub mod types;

pub use client::error::ClientError;
pub use client::request::{ApiRequest, Endpoint};
pub use client::retry::{RefreshMode, RetryPolicy};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use session::{
    FileSessionStore, MemorySessionStore, SessionSignal, SessionState, SessionStore,
    SessionTokens, StoreError,
};
pub use theme::Theme;
