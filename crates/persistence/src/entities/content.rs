//! Content catalog entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the content table.
#[derive(Debug, Clone, FromRow)]
pub struct ContentEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub thumbnail_path: Option<String>,
    pub video_1080_path: Option<String>,
    pub video_4k_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content row with the viewing member's watchlist flag.
#[derive(Debug, Clone, FromRow)]
pub struct MemberContentEntity {
    #[sqlx(flatten)]
    pub content: ContentEntity,
    pub is_favorite: bool,
}

impl From<ContentEntity> for domain::models::Content {
    fn from(entity: ContentEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            category: entity.category,
            thumbnail_path: entity.thumbnail_path,
            video_1080_path: entity.video_1080_path,
            video_4k_path: entity.video_4k_path,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_entity_to_domain() {
        let entity = ContentEntity {
            id: Uuid::new_v4(),
            title: "Paprika".into(),
            description: None,
            category: "Animation".into(),
            thumbnail_path: None,
            video_1080_path: Some("video/paprika.mp4".into()),
            video_4k_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = entity.id;
        let content: domain::models::Content = entity.into();
        assert_eq!(content.id, id);
        assert_eq!(content.category, "Animation");
        assert_eq!(content.video_1080_path.as_deref(), Some("video/paprika.mp4"));
    }
}
