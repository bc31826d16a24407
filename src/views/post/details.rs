use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use log::info;
use serde::Deserialize;

use super::load_post;
use crate::{
    models::post::{delete_post, Post},
    views::{not_found, post_href, post_id, read_form, Nav},
    AppError, AppState,
};

#[derive(Template)]
#[template(path = "post-details.html")]
pub struct PostDetails {
    nav: Nav,
    post: Post,
    self_href: String,
    edit_href: String,
}

pub async fn view_post_details(
    state: &AppState,
    props: &HashMap<String, String>,
) -> Result<Response, AppError> {
    let Some(post) = load_post(&state.pool, props).await? else {
        return not_found(&state.routes);
    };
    Ok(PostDetails {
        nav: Nav::new(&state.routes)?,
        self_href: post_href(&state.routes, "post", post.id)?,
        edit_href: post_href(&state.routes, "edit", post.id)?,
        post,
    }
    .into_response())
}

#[derive(Deserialize)]
pub struct PostActionInput {
    action: String,
}

pub async fn post_post_action(
    state: &AppState,
    props: &HashMap<String, String>,
    request: Request,
) -> Result<Response, AppError> {
    let Some(id) = post_id(props) else {
        return not_found(&state.routes);
    };
    let input: PostActionInput = match read_form(request).await {
        Ok(input) => input,
        Err(rejection) => return Ok(rejection),
    };
    if input.action != "delete" {
        return Ok((StatusCode::BAD_REQUEST, "Unknown action").into_response());
    }
    if !delete_post(&state.pool, id).await? {
        return not_found(&state.routes);
    }
    info!("deleted post {}", id);
    Ok(Redirect::to(&state.routes.href("home", &[])?).into_response())
}
