//! Custom Axum extractors.

pub mod client_info;
pub mod user_auth;

pub use client_info::{client_ip, ClientInfo};
pub use user_auth::{session_token, AdminUser, AuthUser};
