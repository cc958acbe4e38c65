//! In-memory marketplace backend for tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{ApiResult, MarketplaceApi};
use super::error::ApiError;
use super::types::{CreatedTool, LoginResponse};
use crate::domain::{
    Category, ChatMessage, Credentials, NewChatMessage, NewReservation, NewTool, NewUser, ProfileUpdate, Reservation,
    ReservationStatus, Tool, UserProfile,
};
use crate::geo::Coordinate;

#[derive(Debug, Default)]
struct MockState {
    tools: Vec<Tool>,
    categories: Vec<Category>,
    users: Vec<UserProfile>,
    reservations: Vec<Reservation>,
    chats: Vec<ChatMessage>,
    login: Option<LoginResponse>,
    failure: Option<(u16, String)>,
    calls: Vec<String>,
}

/// A scripted backend. Writes are applied to the in-memory state so
/// a following read observes them, like the real server.
#[derive(Debug, Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools(self, tools: Vec<Tool>) -> Self {
        self.lock().tools = tools;
        self
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        self.lock().categories = categories;
        self
    }

    pub fn with_user(self, user: UserProfile) -> Self {
        self.lock().users.push(user);
        self
    }

    /// Response returned by `login`; without one, login answers 401
    pub fn with_login(self, response: LoginResponse) -> Self {
        self.lock().login = Some(response);
        self
    }

    /// Make every call fail with this status and payload message
    pub fn failing(self, status: u16, message: impl Into<String>) -> Self {
        self.lock().failure = Some((status, message.into()));
        self
    }

    /// Names of the calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.lock().reservations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test must not cascade into unrelated assertions
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and apply a scripted failure if any
    fn enter(&self, call: &str) -> ApiResult<std::sync::MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.calls.push(call.to_string());
        match &state.failure {
            Some((status, message)) => Err(ApiError::from_response(
                *status,
                &serde_json::json!({ "message": message }).to_string(),
                "Mock failure",
            )),
            None => Ok(state),
        }
    }
}

fn not_found(what: &str, id: i64) -> ApiError {
    ApiError::Server {
        status: 404,
        message: format!("{} {} not found", what, id),
    }
}

#[async_trait]
impl MarketplaceApi for MockApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let state = self.enter("login")?;
        match &state.login {
            Some(response) if response.email.as_deref().is_none_or(|e| e == credentials.email) => Ok(response.clone()),
            _ => Err(ApiError::Unauthorized),
        }
    }

    async fn register(&self, user: &NewUser) -> ApiResult<Option<UserProfile>> {
        let mut state = self.enter("register")?;
        let profile = UserProfile {
            id: state.users.len() as i64 + 1,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: Some(user.phone.clone()),
            cpf: Some(user.cpf.clone()),
            address: Some(user.address.clone()),
            latitude: Some(user.latitude),
            longitude: Some(user.longitude),
            user_type: None,
        };
        state.users.push(profile.clone());
        Ok(Some(profile))
    }

    async fn get_user(&self, user_id: i64) -> ApiResult<UserProfile> {
        let state = self.enter("get_user")?;
        state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("User", user_id))
    }

    async fn update_user(&self, user_id: i64, update: &ProfileUpdate) -> ApiResult<Option<UserProfile>> {
        let mut state = self.enter("update_user")?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| not_found("User", user_id))?;
        user.name = update.name.clone();
        user.email = update.email.clone();
        user.phone = Some(update.phone.clone());
        user.cpf = Some(update.cpf.clone());
        user.address = Some(update.address.clone());
        Ok(Some(user.clone()))
    }

    async fn list_tools(&self) -> ApiResult<Vec<Tool>> {
        Ok(self.enter("list_tools")?.tools.clone())
    }

    async fn list_nearby_tools(&self, _origin: Coordinate) -> ApiResult<Vec<Tool>> {
        Ok(self.enter("list_nearby_tools")?.tools.clone())
    }

    async fn list_tools_by_category(&self, category: &str) -> ApiResult<Vec<Tool>> {
        let state = self.enter("list_tools_by_category")?;
        Ok(state.tools.iter().filter(|t| t.category == category).cloned().collect())
    }

    async fn get_tool(&self, tool_id: i64) -> ApiResult<Tool> {
        let state = self.enter("get_tool")?;
        state
            .tools
            .iter()
            .find(|t| t.id == tool_id)
            .cloned()
            .ok_or_else(|| not_found("Tool", tool_id))
    }

    async fn create_tool(&self, tool: &NewTool) -> ApiResult<CreatedTool> {
        let mut state = self.enter("create_tool")?;
        let created = Tool {
            id: state.tools.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            user_id: state.login.as_ref().and_then(|l| l.id),
            name: tool.name.clone(),
            description: tool.description.clone(),
            price: tool.price,
            category: tool.category.clone(),
            rating: Some(tool.rating),
            status: tool.status,
            latitude: Some(tool.latitude),
            longitude: Some(tool.longitude),
            image: tool.image.clone(),
            created_at: None,
            updated_at: None,
            distance: None,
        };
        state.tools.push(created.clone());
        Ok(CreatedTool {
            message: Some("Tool created".to_string()),
            tool: created,
        })
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.enter("list_categories")?.categories.clone())
    }

    async fn create_reservation(&self, reservation: &NewReservation) -> ApiResult<Reservation> {
        let mut state = self.enter("create_reservation")?;
        let created = Reservation {
            id: state.reservations.len() as i64 + 1,
            tool_id: Some(reservation.tool_id),
            user_id: state.login.as_ref().and_then(|l| l.id),
            start_date: Some(reservation.start_date),
            end_date: Some(reservation.end_date),
            total_price: Some(reservation.total_price),
            status: ReservationStatus::Pending,
            created_at: None,
            updated_at: None,
        };
        state.reservations.push(created.clone());
        Ok(created)
    }

    async fn list_reservations(&self) -> ApiResult<Vec<Reservation>> {
        Ok(self.enter("list_reservations")?.reservations.clone())
    }

    async fn list_chats(&self, tool_id: i64) -> ApiResult<Vec<ChatMessage>> {
        let state = self.enter("list_chats")?;
        Ok(state
            .chats
            .iter()
            .filter(|c| c.tool_id == Some(tool_id))
            .cloned()
            .collect())
    }

    async fn send_chat(&self, message: &NewChatMessage) -> ApiResult<Option<ChatMessage>> {
        let mut state = self.enter("send_chat")?;
        let chat = ChatMessage {
            id: state.chats.len() as i64 + 1,
            tool_id: Some(message.tool_id),
            reservation_id: None,
            user_id: state.login.as_ref().and_then(|l| l.id),
            sender: state.login.as_ref().and_then(|l| l.name.clone()),
            message: message.message.clone(),
            created_at: None,
        };
        state.chats.push(chat.clone());
        Ok(Some(chat))
    }
}
