use anyhow::Result;
use askama::Template;
use axum::response::{IntoResponse, Response};

use crate::{
    models::post::{get_post_list, Post},
    views::{post_href, Nav},
    AppError, AppState,
};

pub struct PostSummary {
    post: Post,
    href: String,
}

#[derive(Template)]
#[template(path = "post-list.html")]
pub struct PostList {
    nav: Nav,
    posts: Vec<PostSummary>,
}

pub async fn view_post_list(state: &AppState) -> Result<Response, AppError> {
    let posts = get_post_list(&state.pool)
        .await?
        .into_iter()
        .map(|post| {
            let href = post_href(&state.routes, "post", post.id)?;
            Ok(PostSummary { post, href })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PostList {
        nav: Nav::new(&state.routes)?,
        posts,
    }
    .into_response())
}
