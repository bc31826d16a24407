use std::sync::Arc;

use axum::{debug_handler, extract::Path, http::StatusCode, Extension, Json};
use log::{error, info};

use crate::{
    models::post::{self, Post, PostInput},
    AppState,
};

fn internal_error(err: sqlx::Error) -> StatusCode {
    error!("database error: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn validate(input: &PostInput) -> Result<(), StatusCode> {
    input
        .validate()
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)
}

#[debug_handler]
pub async fn list_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Post>>, StatusCode> {
    let posts = post::get_post_list(&state.pool)
        .await
        .map_err(internal_error)?;
    Ok(Json(posts))
}

#[debug_handler]
pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>), StatusCode> {
    validate(&input)?;
    let post = post::insert_post(&state.pool, &input)
        .await
        .map_err(internal_error)?;
    info!("created post {} via api", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

#[debug_handler]
pub async fn get_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, StatusCode> {
    post::get_post_by_id(&state.pool, id)
        .await
        .map_err(internal_error)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[debug_handler]
pub async fn update_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, StatusCode> {
    validate(&input)?;
    let post = post::update_post(&state.pool, id, &input)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;
    info!("updated post {} via api", post.id);
    Ok(Json(post))
}

#[debug_handler]
pub async fn delete_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    if post::delete_post(&state.pool, id)
        .await
        .map_err(internal_error)?
    {
        info!("deleted post {} via api", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
