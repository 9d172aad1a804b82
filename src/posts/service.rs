//! Posts business logic.
//!
//! [`PostsService`] is the capability controllers depend on.
//! [`SqlPostsService`] implements it against a read pool and a write pool.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::error::PostError;
use super::model::{Post, PostId};
use crate::db::DbPool;

/// Operations on posts.
#[async_trait]
pub trait PostsService: Send + Sync {
    /// All posts ordered by id. An empty table is [`PostError::NotFound`].
    async fn list(&self) -> Result<Vec<Post>, PostError>;

    async fn find(&self, id: PostId) -> Result<Post, PostError>;

    /// Validates and stores `post`. A zero id lets storage assign one; an
    /// explicit id that is already taken is [`PostError::Duplicate`].
    async fn create(&self, post: Post) -> Result<Post, PostError>;

    /// Validates `post`, then overwrites the stored post with the same id.
    /// Validation runs before the existence check.
    async fn update(&self, post: Post) -> Result<Post, PostError>;

    async fn delete(&self, id: PostId) -> Result<(), PostError>;
}

const COLUMNS: &str = "id, title, content, created_at, updated_at";

/// [`PostsService`] backed by SQL storage.
#[derive(Clone, Debug)]
pub struct SqlPostsService {
    reader: DbPool,
    writer: DbPool,
}

impl SqlPostsService {
    /// Both handles are required.
    pub fn new(reader: Option<DbPool>, writer: Option<DbPool>) -> Result<Self, PostError> {
        match (reader, writer) {
            (Some(reader), Some(writer)) => Ok(Self { reader, writer }),
            _ => Err(PostError::MissingStorage),
        }
    }
}

fn not_found_on_no_rows(e: sqlx::Error) -> PostError {
    match e {
        sqlx::Error::RowNotFound => PostError::NotFound,
        e => PostError::Storage(e),
    }
}

#[async_trait]
impl PostsService for SqlPostsService {
    async fn list(&self) -> Result<Vec<Post>, PostError> {
        let posts: Vec<Post> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM posts ORDER BY id"))
            .fetch_all(&self.reader)
            .await?;
        if posts.is_empty() {
            return Err(PostError::NotFound);
        }
        Ok(posts)
    }

    async fn find(&self, id: PostId) -> Result<Post, PostError> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.reader)
            .await
            .map_err(not_found_on_no_rows)
    }

    async fn create(&self, post: Post) -> Result<Post, PostError> {
        post.validate()?;

        let now = Utc::now();
        let id = (!post.id.is_unassigned()).then_some(post.id);
        let created: Post = sqlx::query_as(&format!(
            "INSERT INTO posts (id, title, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(now)
        .bind(now)
        .fetch_one(&self.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => PostError::Duplicate,
            e => PostError::Storage(e),
        })?;

        debug!(id = %created.id, "post created");
        Ok(created)
    }

    async fn update(&self, post: Post) -> Result<Post, PostError> {
        post.validate()?;
        self.find(post.id).await?;

        // The row can vanish between the check and the write; that reads as
        // not found too.
        let updated: Post = sqlx::query_as(&format!(
            "UPDATE posts SET title = ?, content = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(Utc::now())
        .bind(post.id)
        .fetch_one(&self.writer)
        .await
        .map_err(not_found_on_no_rows)?;

        debug!(id = %updated.id, "post updated");
        Ok(updated)
    }

    async fn delete(&self, id: PostId) -> Result<(), PostError> {
        let post = self.find(id).await?;
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post.id)
            .execute(&self.writer)
            .await?;
        debug!(%id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn service() -> SqlPostsService {
        let pool = db::connect_in_memory().await.unwrap();
        db::migrate(&pool).await.unwrap();
        SqlPostsService::new(Some(pool.clone()), Some(pool)).unwrap()
    }

    #[tokio::test]
    async fn construction_requires_both_handles() {
        let pool = db::connect_in_memory().await.unwrap();
        assert!(SqlPostsService::new(Some(pool.clone()), Some(pool.clone())).is_ok());
        for (reader, writer) in [(None, Some(pool.clone())), (Some(pool), None), (None, None)] {
            let err = SqlPostsService::new(reader, writer).unwrap_err();
            assert!(matches!(err, PostError::MissingStorage));
        }
    }

    #[tokio::test]
    async fn list_on_empty_table_is_not_found() {
        let service = service().await;
        assert!(matches!(service.list().await, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn list_returns_posts_in_id_order() {
        let service = service().await;
        let first = service.create(Post::new("first", "a")).await.unwrap();
        let second = service.create(Post::new("second", "b")).await.unwrap();

        let posts = service.list().await.unwrap();
        let ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, [first.id, second.id]);
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let service = service().await;
        let created = service.create(Post::new("x".repeat(255), "c")).await.unwrap();

        assert!(!created.id.is_unassigned());
        assert_eq!(created.title, "x".repeat(255));
        assert_eq!(created.content, "c");
        assert!(created.created_at.is_some());
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_invalid_titles() {
        let service = service().await;
        for title in [String::new(), "x".repeat(256)] {
            let err = service.create(Post::new(title, "c")).await.unwrap_err();
            assert!(matches!(err, PostError::InvalidTitle));
        }
        assert!(matches!(service.list().await, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn create_with_explicit_id() {
        let service = service().await;
        let post = Post { id: PostId(69), ..Post::new("explicit", "") };
        let created = service.create(post).await.unwrap();
        assert_eq!(created.id, PostId(69));
    }

    #[tokio::test]
    async fn create_with_taken_id_is_duplicate() {
        let service = service().await;
        let existing = service.create(Post::new("original", "")).await.unwrap();

        let clash = Post { id: existing.id, ..Post::new("clash", "") };
        let err = service.create(clash).await.unwrap_err();
        assert!(matches!(err, PostError::Duplicate));

        assert_eq!(service.find(existing.id).await.unwrap().title, "original");
    }

    #[tokio::test]
    async fn find_missing_is_not_found() {
        let service = service().await;
        assert!(matches!(service.find(PostId(404)).await, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn round_trip() {
        let service = service().await;
        let created = service.create(Post::new("title", "content")).await.unwrap();

        let found = service.find(created.id).await.unwrap();
        assert_eq!((found.title.as_str(), found.content.as_str()), ("title", "content"));

        let changed = Post { id: created.id, ..Post::new("new title", "new content") };
        let updated = service.update(changed).await.unwrap();
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.created_at, created.created_at);

        let found = service.find(created.id).await.unwrap();
        assert_eq!((found.title.as_str(), found.content.as_str()), ("new title", "new content"));

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.find(created.id).await, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn update_overwrites_whole_row() {
        let service = service().await;
        let created = service.create(Post::new("title", "content")).await.unwrap();

        let updated = service
            .update(Post { id: created.id, ..Post::new("title", "") })
            .await
            .unwrap();
        assert_eq!(updated.content, "");
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let service = service().await;
        let post = Post { id: PostId(7), ..Post::new("valid", "") };
        assert!(matches!(service.update(post).await, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn update_validates_before_existence_check() {
        let service = service().await;
        let post = Post { id: PostId(7), ..Post::new("", "") };
        assert!(matches!(service.update(post).await, Err(PostError::InvalidTitle)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let service = service().await;
        assert!(matches!(service.delete(PostId(1)).await, Err(PostError::NotFound)));

        let created = service.create(Post::new("once", "")).await.unwrap();
        service.delete(created.id).await.unwrap();
        assert!(matches!(service.delete(created.id).await, Err(PostError::NotFound)));
    }

    #[tokio::test]
    async fn storage_errors_pass_through() {
        let pool = db::connect_in_memory().await.unwrap();
        let service = SqlPostsService::new(Some(pool.clone()), Some(pool)).unwrap();

        // Schema never migrated.
        let err = service.find(PostId(1)).await.unwrap_err();
        assert!(matches!(err, PostError::Storage(_)));
        assert!(err.to_string().contains("no such table"));
    }
}
