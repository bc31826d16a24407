use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::models::post::{get_post_by_id, Post};

use super::post_id;

pub mod details;
pub mod editor;

/// Looks up the post named by the `id` prop. A missing or malformed id is `None`.
async fn load_post(
    pool: &SqlitePool,
    props: &HashMap<String, String>,
) -> Result<Option<Post>, sqlx::Error> {
    match post_id(props) {
        Some(id) => get_post_by_id(pool, id).await,
        None => Ok(None),
    }
}
