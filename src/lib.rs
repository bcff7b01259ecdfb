//! Table Timer - dining-time control for all-you-can-eat restaurants
//!
//! This library provides the core functionality of the table timer: staff
//! issue a QR code per table, guests scan it to watch a 90-minute countdown,
//! and the staff console raises an alert when a table's time runs out.

pub mod api;
pub mod config;
pub mod models;
pub mod pages;
pub mod services;
pub mod store;
