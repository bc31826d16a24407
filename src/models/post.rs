use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Post {
    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Payload for creating or replacing a post. Shared by the HTML forms and the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl PostInput {
    pub fn validate(&self) -> Result<(), &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required");
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err("Title is too long");
        }
        Ok(())
    }
}

impl From<&Post> for PostInput {
    fn from(post: &Post) -> Self {
        PostInput {
            title: post.title.clone(),
            content: post.content.clone(),
        }
    }
}

pub async fn get_post_list(pool: &SqlitePool) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, created_at, updated_at
        FROM posts
        ORDER BY id DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, created_at, updated_at
        FROM posts WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_post(pool: &SqlitePool, input: &PostInput) -> Result<Post, sqlx::Error> {
    let now = OffsetDateTime::now_utc();
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, content, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, title, content, created_at, updated_at
        "#,
    )
    .bind(input.title.trim())
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Replaces title and content. `None` when no post has this id.
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    input: &PostInput,
) -> Result<Option<Post>, sqlx::Error> {
    let now = OffsetDateTime::now_utc();
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = ?, content = ?, updated_at = ?
        WHERE id = ?
        RETURNING id, title, content, created_at, updated_at
        "#,
    )
    .bind(input.title.trim())
    .bind(&input.content)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Returns whether a post was actually removed.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
