//! Repository implementations for database operations.

pub mod account_recovery;
pub mod content;
pub mod email_outbox;
pub mod movie_request;
pub mod setting;
pub mod subscription;
pub mod user;

pub use account_recovery::AccountRecoveryRepository;
pub use content::{ContentChanges, ContentRepository, NewContent};
pub use email_outbox::EmailOutboxRepository;
pub use movie_request::{MovieRequestRepository, SubmitOutcome};
pub use setting::SettingRepository;
pub use subscription::{CheckoutProfile, NewSubscription, SubscriptionRepository};
pub use user::{LoginContext, NewUser, UserRepository};
