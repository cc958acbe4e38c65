//! Local session persistence
//!
//! The access token and a few user attributes live in a small key-value
//! store, read at start-up to decide whether the user is logged in.

pub mod kv;
pub mod store;

pub use kv::{FileKvStore, KvStore, MemoryKvStore};
pub use store::{AuthenticatedSession, SESSION_KEYS, Session, SessionStore, SessionUser};
