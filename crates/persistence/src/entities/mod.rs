//! Entity definitions (database row mappings).

pub mod content;
pub mod email_outbox;
pub mod movie_request;
pub mod setting;
pub mod subscription;
pub mod user;

pub use content::{ContentEntity, MemberContentEntity};
pub use email_outbox::EmailOutboxEntity;
pub use movie_request::{MovieRequestEntity, MovieRequestWithEmailEntity, QuotaWindowEntity};
pub use setting::SettingEntity;
pub use subscription::{SubscriptionEntity, SubscriptionWithEmailEntity};
pub use user::{AdminUserEntity, LoginHistoryEntity, UserEntity};
