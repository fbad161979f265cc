//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod content;
pub mod health;
pub mod payment;
pub mod requests;
pub mod users;
