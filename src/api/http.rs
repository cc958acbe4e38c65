//! HTTP implementation of the marketplace API
//!
//! Thin reqwest wrapper: one request per call, bearer token attached by a
//! single hook, non-success statuses classified by [`ApiError::from_response`].

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use super::client::{ApiResult, MarketplaceApi, TokenSource};
use super::error::ApiError;
use super::types::{CreatedTool, LoginResponse, message_of, unwrap_envelope};
use crate::domain::{
    Category, ChatMessage, Credentials, NewChatMessage, NewReservation, NewTool, NewUser, ProfileUpdate, Reservation,
    Tool, UserProfile,
};
use crate::geo::Coordinate;

/// Backend used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

// Fallback texts when an error response carries no message
const LOGIN_FAILED: &str = "Unknown error. Please try again.";
const REGISTER_FAILED: &str = "Error registering user.";
const PROFILE_LOAD_FAILED: &str = "Error loading user data.";
const PROFILE_UPDATE_FAILED: &str = "Error updating profile.";
const TOOLS_LOAD_FAILED: &str = "Error loading tools.";
const NEARBY_LOAD_FAILED: &str = "Error loading nearby tools.";
const TOOL_LOAD_FAILED: &str = "Error loading tool details.";
const TOOL_CREATE_FAILED: &str = "Error creating the tool. Please try again.";
const CATEGORIES_LOAD_FAILED: &str = "Error loading categories.";
const RESERVATION_FAILED: &str = "Error making the reservation. Please try again.";
const RESERVATIONS_LOAD_FAILED: &str = "Error loading reservations.";
const CHATS_LOAD_FAILED: &str = "Error loading messages.";
const CHAT_SEND_FAILED: &str = "Error sending message.";

/// reqwest-backed [`MarketplaceApi`]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl HttpApi {
    /// Create a client for `base_url`; `tokens` is consulted on every request
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL for an API path like `/tool/3`
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Every request goes through here so the token hook cannot be skipped
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        let builder = self.client.request(method, self.url(path));
        self.authorize(builder)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the JSON body, `Null` for an empty body
    async fn send(&self, builder: RequestBuilder, fallback: &str) -> ApiResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body, fallback);
            warn!("Request failed with {}: {}", status, err);
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {}", e)))
    }
}

fn parse_base_url(base_url: &str) -> ApiResult<Url> {
    let url = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::InvalidBaseUrl(format!(
            "{}: unsupported scheme '{}'",
            base_url, scheme
        ))),
    }
}

/// Records echoed back by write endpoints are informational only
fn optional_record<T: serde::de::DeserializeOwned>(body: Value, key: &str) -> Option<T> {
    if body.is_null() {
        return None;
    }
    match unwrap_envelope(body, key) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Ignoring unparseable {} in response: {}", key, e);
            None
        }
    }
}

#[async_trait]
impl MarketplaceApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let body = self
            .send(self.request(Method::POST, "/session").json(credentials), LOGIN_FAILED)
            .await?;
        serde_json::from_value(body).map_err(|e| ApiError::InvalidResponse(format!("session: {}", e)))
    }

    async fn register(&self, user: &NewUser) -> ApiResult<Option<UserProfile>> {
        let body = self
            .send(self.request(Method::POST, "/user").json(user), REGISTER_FAILED)
            .await?;
        Ok(optional_record(body, "user"))
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<UserProfile> {
        let body = self
            .send(self.request(Method::GET, &format!("/user/{}", user_id)), PROFILE_LOAD_FAILED)
            .await?;
        unwrap_envelope(body, "user")
    }

    async fn update_user(&self, user_id: i64, update: &ProfileUpdate) -> ApiResult<Option<UserProfile>> {
        let builder = self.request(Method::PUT, &format!("/user/{}", user_id)).json(update);
        let body = self.send(builder, PROFILE_UPDATE_FAILED).await?;
        Ok(optional_record(body, "user"))
    }

    async fn list_tools(&self) -> ApiResult<Vec<Tool>> {
        let body = self.send(self.request(Method::GET, "/tool"), TOOLS_LOAD_FAILED).await?;
        unwrap_envelope(body, "tools")
    }

    async fn list_nearby_tools(&self, origin: Coordinate) -> ApiResult<Vec<Tool>> {
        let builder = self
            .request(Method::GET, "/tool")
            .query(&[("latitude", origin.latitude), ("longitude", origin.longitude)]);
        let body = self.send(builder, NEARBY_LOAD_FAILED).await?;
        unwrap_envelope(body, "tools")
    }

    async fn list_tools_by_category(&self, category: &str) -> ApiResult<Vec<Tool>> {
        let builder = self.request(Method::GET, "/tool").query(&[("category", category)]);
        let body = self.send(builder, TOOLS_LOAD_FAILED).await?;
        unwrap_envelope(body, "tools")
    }

    async fn get_tool(&self, tool_id: i64) -> ApiResult<Tool> {
        let body = self
            .send(self.request(Method::GET, &format!("/tool/{}", tool_id)), TOOL_LOAD_FAILED)
            .await?;
        unwrap_envelope(body, "tool")
    }

    async fn create_tool(&self, tool: &NewTool) -> ApiResult<CreatedTool> {
        let body = self
            .send(self.request(Method::POST, "/tool").json(tool), TOOL_CREATE_FAILED)
            .await?;
        let message = message_of(&body);
        let tool = unwrap_envelope(body, "tool")?;
        Ok(CreatedTool { message, tool })
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        let body = self
            .send(self.request(Method::GET, "/category"), CATEGORIES_LOAD_FAILED)
            .await?;
        unwrap_envelope(body, "categories")
    }

    async fn create_reservation(&self, reservation: &NewReservation) -> ApiResult<Reservation> {
        let body = self
            .send(self.request(Method::POST, "/reservations").json(reservation), RESERVATION_FAILED)
            .await?;
        unwrap_envelope(body, "reservation")
    }

    async fn list_reservations(&self) -> ApiResult<Vec<Reservation>> {
        let body = self
            .send(self.request(Method::GET, "/reservations"), RESERVATIONS_LOAD_FAILED)
            .await?;
        unwrap_envelope(body, "reservations")
    }

    async fn list_chats(&self, tool_id: i64) -> ApiResult<Vec<ChatMessage>> {
        let body = self
            .send(self.request(Method::GET, &format!("/tool/{}/chats", tool_id)), CHATS_LOAD_FAILED)
            .await?;
        unwrap_envelope(body, "chats")
    }

    async fn send_chat(&self, message: &NewChatMessage) -> ApiResult<Option<ChatMessage>> {
        let body = self
            .send(self.request(Method::POST, "/chats").json(message), CHAT_SEND_FAILED)
            .await?;
        Ok(optional_record(body, "chat"))
    }
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::{NoToken, StaticToken};

    fn api(base: &str) -> HttpApi {
        HttpApi::new(base, Arc::new(NoToken)).unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(api("http://10.0.0.5:3333").url("/tool/3"), "http://10.0.0.5:3333/tool/3");
        assert_eq!(api("http://10.0.0.5:3333/").url("/tool"), "http://10.0.0.5:3333/tool");
        assert_eq!(api("https://example.com/api/").url("/chats"), "https://example.com/api/chats");
    }

    #[test]
    fn test_rejects_bad_base_urls() {
        assert!(matches!(
            HttpApi::new("not a url", Arc::new(NoToken)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpApi::new("ftp://example.com", Arc::new(NoToken)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_request_hook_attaches_bearer_token() {
        let api = HttpApi::new(DEFAULT_BASE_URL, Arc::new(StaticToken::new("abc123"))).unwrap();
        let request = api.request(Method::GET, "/tool").build().unwrap();
        let auth = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer abc123");
    }

    #[test]
    fn test_request_hook_without_token() {
        let request = api(DEFAULT_BASE_URL).request(Method::GET, "/tool").build().unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_optional_record() {
        let none: Option<ChatMessage> = optional_record(Value::Null, "chat");
        assert!(none.is_none());
        let junk: Option<ChatMessage> = optional_record(serde_json::json!({"message": "sent"}), "chat");
        assert!(junk.is_none());
        let echoed: Option<ChatMessage> =
            optional_record(serde_json::json!({"chat": {"id": 1, "message": "oi"}}), "chat");
        assert_eq!(echoed.unwrap().id, 1);
    }
}
