//! Data models
//!
//! This module contains the data structures shared by the store, the services
//! and the HTTP layer:
//! - Table sessions (one dining window per issued code)
//! - The admin login flag
//! - Expiry notifications shown on the staff console

mod notification;
mod session;
mod table;

pub use notification::Notification;
pub use session::{AdminSession, ADMIN_SESSION_HOURS};
pub use table::{SessionStatus, TableSession, SESSION_DURATION_MINUTES};
