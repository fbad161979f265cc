//! Application services sitting between routes and repositories.

pub mod admin_bootstrap;
pub mod auth;
pub mod cookies;
pub mod email;
pub mod requests;
pub mod settings;

pub use auth::AuthService;
pub use email::EmailService;
pub use requests::MovieRequestService;
pub use settings::SettingsService;
