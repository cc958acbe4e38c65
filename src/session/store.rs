//! Session lifecycle over the key-value store
//!
//! anonymous -> authenticated (login) -> anonymous (logout). The stored keys
//! are always written and cleared as one group.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use super::kv::{FileKvStore, KvStore, MemoryKvStore};
use crate::api::{LoginResponse, TokenSource};
use crate::domain::UserType;
use crate::error::Result;

pub const TOKEN_KEY: &str = "access_token";
pub const USER_NAME_KEY: &str = "user_name";
pub const USER_EMAIL_KEY: &str = "user_email";
pub const USER_ID_KEY: &str = "user_id";
pub const USER_TYPE_KEY: &str = "user_type";

/// Every key owned by the session
pub const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, USER_NAME_KEY, USER_EMAIL_KEY, USER_ID_KEY, USER_TYPE_KEY];

/// Cached user attributes returned at login
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUser {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub user_type: Option<UserType>,
}

/// A logged-in session: bearer token plus cached user fields
#[derive(Clone, PartialEq)]
pub struct AuthenticatedSession {
    token: String,
    pub user: SessionUser,
}

impl AuthenticatedSession {
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// None when the backend answered without a usable token
    pub fn from_login(response: LoginResponse) -> Option<Self> {
        let token = response.token.filter(|t| !t.trim().is_empty())?;
        Some(Self::new(
            token,
            SessionUser {
                id: response.id,
                name: response.name.unwrap_or_default(),
                email: response.email.unwrap_or_default(),
                user_type: response.user_type,
            },
        ))
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// The current session, as one immutable value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedSession),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Session::Authenticated(auth) => Some(&auth.user),
            Session::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated(auth) => Some(auth.token()),
            Session::Anonymous => None,
        }
    }
}

/// Reads and writes the session keys. Also the token hook for the HTTP client.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Session persisted in a JSON file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Arc::new(FileKvStore::open(path)?)))
    }

    /// Session that disappears with the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    /// Current session. Token presence alone decides authentication; a
    /// missing or garbled user field never demotes the session.
    pub fn load(&self) -> Result<Session> {
        let Some(token) = self.stored_token()? else {
            return Ok(Session::Anonymous);
        };

        let user = SessionUser {
            id: self.kv.get(USER_ID_KEY)?.and_then(|id| id.trim().parse().ok()),
            name: self.kv.get(USER_NAME_KEY)?.unwrap_or_default(),
            email: self.kv.get(USER_EMAIL_KEY)?.unwrap_or_default(),
            user_type: self.kv.get(USER_TYPE_KEY)?.and_then(|t| parse_user_type(&t)),
        };
        Ok(Session::Authenticated(AuthenticatedSession::new(token, user)))
    }

    /// Persist a freshly authenticated session, replacing any previous one
    pub fn begin(&self, session: &AuthenticatedSession) -> Result<()> {
        let user = &session.user;
        self.kv.set_many(&[
            (TOKEN_KEY, session.token.clone()),
            (USER_NAME_KEY, user.name.clone()),
            (USER_EMAIL_KEY, user.email.clone()),
            (USER_ID_KEY, user.id.map(|id| id.to_string()).unwrap_or_default()),
            (USER_TYPE_KEY, user.user_type.map(|t| t.to_string()).unwrap_or_default()),
        ])?;
        info!("Session started for {}", user.email);
        Ok(())
    }

    /// Drop every session key
    pub fn clear(&self) -> Result<()> {
        self.kv.remove_many(&SESSION_KEYS)?;
        info!("Session cleared");
        Ok(())
    }

    /// Token presence only; no expiry check, no refresh
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.stored_token()?.is_some())
    }

    fn stored_token(&self) -> Result<Option<String>> {
        Ok(self.kv.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty()))
    }
}

fn parse_user_type(text: &str) -> Option<UserType> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_value(serde_json::Value::String(text.trim().to_string())).ok()
}

impl TokenSource for SessionStore {
    fn access_token(&self) -> Option<String> {
        match self.stored_token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read access token: {}", e);
                None
            }
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
