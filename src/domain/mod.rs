//! Domain types for the marketplace
//!
//! Records as the backend returns them, normalized at deserialization time,
//! plus the forms the client submits.

pub mod category;
pub mod chat;
pub mod lenient;
pub mod reservation;
pub mod tool;
pub mod user;

pub use category::Category;
pub use chat::{ChatMessage, NewChatMessage};
pub use reservation::{NewReservation, Reservation, ReservationStatus};
pub use tool::{NewTool, Tool, ToolStatus};
pub use user::{Credentials, NewUser, ProfileUpdate, UserProfile, UserType};
