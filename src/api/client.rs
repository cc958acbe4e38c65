//! Marketplace API trait and the bearer-token hook

use async_trait::async_trait;

use super::error::ApiError;
use super::types::{CreatedTool, LoginResponse};
use crate::domain::{
    Category, ChatMessage, Credentials, NewChatMessage, NewReservation, NewTool, NewUser, ProfileUpdate, Reservation,
    Tool, UserProfile,
};
use crate::geo::Coordinate;

/// Result alias for single backend calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Request/response access to the marketplace backend.
///
/// Each call is independent: no retries, no timeouts, no caching.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// `POST /session`
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;

    /// `POST /user`. Returns the created user when the backend echoes it.
    async fn register(&self, user: &NewUser) -> ApiResult<Option<UserProfile>>;

    /// `GET /user/{id}`
    async fn get_user(&self, user_id: i64) -> ApiResult<UserProfile>;

    /// `PUT /user/{id}`
    async fn update_user(&self, user_id: i64, update: &ProfileUpdate) -> ApiResult<Option<UserProfile>>;

    /// `GET /tool`
    async fn list_tools(&self) -> ApiResult<Vec<Tool>>;

    /// `GET /tool?latitude=..&longitude=..`
    async fn list_nearby_tools(&self, origin: Coordinate) -> ApiResult<Vec<Tool>>;

    /// `GET /tool?category=..`
    async fn list_tools_by_category(&self, category: &str) -> ApiResult<Vec<Tool>>;

    /// `GET /tool/{id}`
    async fn get_tool(&self, tool_id: i64) -> ApiResult<Tool>;

    /// `POST /tool`
    async fn create_tool(&self, tool: &NewTool) -> ApiResult<CreatedTool>;

    /// `GET /category`
    async fn list_categories(&self) -> ApiResult<Vec<Category>>;

    /// `POST /reservations`. Not idempotent: submitting twice books twice.
    async fn create_reservation(&self, reservation: &NewReservation) -> ApiResult<Reservation>;

    /// `GET /reservations` for the current user
    async fn list_reservations(&self) -> ApiResult<Vec<Reservation>>;

    /// `GET /tool/{id}/chats`
    async fn list_chats(&self, tool_id: i64) -> ApiResult<Vec<ChatMessage>>;

    /// `POST /chats`
    async fn send_chat(&self, message: &NewChatMessage) -> ApiResult<Option<ChatMessage>>;
}

/// Supplies the bearer token at request time
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Never authenticates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn access_token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, independent of any stored session
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone()).filter(|t| !t.is_empty())
    }
}
