//! Marketplace service - the operations a front end drives
//!
//! Composes the backend API, the local session and the geo helpers. Inputs
//! are validated here before any request goes out; everything else
//! (availability conflicts, authorization, chat delivery) is the backend's
//! call.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};

use crate::api::{CreatedTool, MarketplaceApi};
use crate::catalog::ToolQuery;
use crate::domain::{
    Category, ChatMessage, Credentials, NewChatMessage, NewReservation, NewTool, NewUser, ProfileUpdate, Reservation,
    Tool, UserProfile,
};
use crate::error::{Result, ToolshareError};
use crate::geo::{Coordinate, Radius, annotate_nearby};
use crate::session::{AuthenticatedSession, Session, SessionStore};

/// Front-end facing operations over an API implementation
pub struct Marketplace<A: MarketplaceApi> {
    api: A,
    session: Arc<SessionStore>,
}

impl<A: MarketplaceApi> Marketplace<A> {
    /// `session` should be the same store the API reads its token from
    pub fn new(api: A, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    //=== Session ===

    /// Authenticate and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedSession> {
        let credentials = Credentials::new(email, password);
        credentials.validate()?;

        let response = self.api.login(&credentials).await?;
        let session = AuthenticatedSession::from_login(response)
            .ok_or_else(|| ToolshareError::InvalidInput("login succeeded but no token was returned".to_string()))?;

        self.session.begin(&session)?;
        info!("Logged in as {}", session.user.email);
        Ok(session)
    }

    /// Forget the session locally. The backend is not contacted.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    pub fn session(&self) -> Result<Session> {
        self.session.load()
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.session.is_authenticated()
    }

    fn require_session(&self, action: &str) -> Result<AuthenticatedSession> {
        match self.session.load()? {
            Session::Authenticated(auth) => Ok(auth),
            Session::Anonymous => Err(ToolshareError::NotAuthenticated(action.to_string())),
        }
    }

    fn require_user_id(&self, action: &str) -> Result<i64> {
        self.require_session(action)?
            .user
            .id
            .ok_or_else(|| ToolshareError::NotAuthenticated(format!("{} (stored session has no user id)", action)))
    }

    //=== Accounts ===

    pub async fn register(&self, user: &NewUser) -> Result<Option<UserProfile>> {
        user.validate()?;
        Ok(self.api.register(user).await?)
    }

    /// Profile of the logged-in user
    pub async fn profile(&self) -> Result<UserProfile> {
        let user_id = self.require_user_id("view your profile")?;
        Ok(self.api.get_user(user_id).await?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Option<UserProfile>> {
        update.validate()?;
        let user_id = self.require_user_id("update your profile")?;
        Ok(self.api.update_user(user_id, update).await?)
    }

    //=== Catalog ===

    /// Every tool, filtered client-side by `query`
    pub async fn tools(&self, query: &ToolQuery) -> Result<Vec<Tool>> {
        let tools = self.api.list_tools().await?;
        Ok(query.apply(tools))
    }

    /// Server-side category listing
    pub async fn tools_in_category(&self, category: &str) -> Result<Vec<Tool>> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ToolshareError::InvalidInput("category is required".to_string()));
        }
        Ok(self.api.list_tools_by_category(category).await?)
    }

    pub async fn tool(&self, tool_id: i64) -> Result<Tool> {
        Ok(self.api.get_tool(tool_id).await?)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.api.list_categories().await?)
    }

    pub async fn create_tool(&self, tool: &NewTool) -> Result<CreatedTool> {
        tool.validate()?;
        self.require_session("list a tool")?;
        let created = self.api.create_tool(tool).await?;
        info!("Created tool {} ({})", created.tool.id, created.tool.name);
        Ok(created)
    }

    /// Tools near `origin`, each annotated with its distance, then narrowed
    /// by `query`. Order follows the backend's.
    pub async fn nearby_tools(&self, origin: Coordinate, radius: Radius, query: &ToolQuery) -> Result<Vec<Tool>> {
        let candidates = self.api.list_nearby_tools(origin).await?;
        debug!("Backend returned {} nearby candidates", candidates.len());
        Ok(query.apply(annotate_nearby(origin, candidates, radius)))
    }

    //=== Reservations ===

    /// Reserve `tool_id` from `start` to `end`.
    ///
    /// The tool is re-fetched so availability and price are current. The
    /// request is not idempotent; callers must not resubmit on failure
    /// without checking `reservations()` first.
    pub async fn reserve(&self, tool_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Reservation> {
        self.require_session("reserve a tool")?;
        if start >= end {
            return Err(ToolshareError::InvalidReservation(format!(
                "end date {} must be after start date {}",
                end, start
            )));
        }

        let tool = self.api.get_tool(tool_id).await?;
        let request = NewReservation::for_tool(&tool, start, end)?;
        let reservation = self.api.create_reservation(&request).await?;
        info!(
            "Reserved tool {} from {} to {} (reservation {})",
            tool_id, start, end, reservation.id
        );
        Ok(reservation)
    }

    pub async fn reservations(&self) -> Result<Vec<Reservation>> {
        self.require_session("see your reservations")?;
        Ok(self.api.list_reservations().await?)
    }

    //=== Chat ===

    pub async fn chat(&self, tool_id: i64) -> Result<Vec<ChatMessage>> {
        self.require_session("open the chat")?;
        Ok(self.api.list_chats(tool_id).await?)
    }

    /// Send a message and return the refreshed conversation
    pub async fn send_chat(&self, tool_id: i64, text: &str) -> Result<Vec<ChatMessage>> {
        self.require_session("send messages")?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ToolshareError::InvalidInput("message is empty".to_string()));
        }

        self.api
            .send_chat(&NewChatMessage {
                tool_id,
                message: text.to_string(),
            })
            .await?;
        Ok(self.api.list_chats(tool_id).await?)
    }
}
