//! Services layer - Business logic
//!
//! This module contains the table timer's business logic:
//! - Countdown derivation shared by both screens
//! - Code issuing and QR rendering
//! - Expiry notifications
//! - The staff console and the customer surface
//! - Staff login

pub mod auth;
pub mod console;
pub mod countdown;
pub mod customer;
pub mod issuer;
pub mod notifications;
pub mod ticker;

pub use auth::{AuthError, AuthService, LoginInput};
pub use console::{ConsoleError, ConsoleStats, DashboardSnapshot, SessionListing, SessionRow, StaffConsole};
pub use countdown::{Countdown, CountdownStatus};
pub use customer::{resolve_view, CustomerSurface, CustomerView};
pub use issuer::{parse_locator, CodeIssuer, IssueError, IssuedCode, QrImage};
pub use notifications::NotificationDeriver;
pub use ticker::{spawn_ticker, TickerHandle};
