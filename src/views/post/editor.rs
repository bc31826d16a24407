use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use log::info;

use super::load_post;
use crate::{
    models::post::{insert_post, update_post, PostInput},
    views::{not_found, post_href, post_id, read_form, Nav},
    AppError, AppState,
};

#[derive(Template)]
#[template(path = "post-form.html")]
pub struct PostForm {
    nav: Nav,
    heading: &'static str,
    submit_label: &'static str,
    action_href: String,
    cancel_href: String,
    input: PostInput,
    error: Option<&'static str>,
}

impl PostForm {
    fn create(state: &AppState, input: PostInput) -> anyhow::Result<Self> {
        let nav = Nav::new(&state.routes)?;
        Ok(PostForm {
            heading: "New post",
            submit_label: "Publish",
            action_href: state.routes.href("create", &[])?,
            cancel_href: nav.home.clone(),
            nav,
            input,
            error: None,
        })
    }

    fn edit(state: &AppState, id: i64, input: PostInput) -> anyhow::Result<Self> {
        Ok(PostForm {
            nav: Nav::new(&state.routes)?,
            heading: "Edit post",
            submit_label: "Save",
            action_href: post_href(&state.routes, "edit", id)?,
            cancel_href: post_href(&state.routes, "post", id)?,
            input,
            error: None,
        })
    }

    fn rejected(mut self, error: &'static str) -> Response {
        self.error = Some(error);
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

pub fn view_create_post(state: &AppState) -> Result<Response, AppError> {
    Ok(PostForm::create(state, PostInput::default())?.into_response())
}

pub async fn post_create_post(state: &AppState, request: Request) -> Result<Response, AppError> {
    let input: PostInput = match read_form(request).await {
        Ok(input) => input,
        Err(rejection) => return Ok(rejection),
    };
    if let Err(error) = input.validate() {
        return Ok(PostForm::create(state, input)?.rejected(error));
    }
    let post = insert_post(&state.pool, &input).await?;
    info!("created post {} ({:?})", post.id, post.title);
    Ok(Redirect::to(&post_href(&state.routes, "post", post.id)?).into_response())
}

pub async fn view_edit_post(
    state: &AppState,
    props: &HashMap<String, String>,
) -> Result<Response, AppError> {
    let Some(post) = load_post(&state.pool, props).await? else {
        return not_found(&state.routes);
    };
    Ok(PostForm::edit(state, post.id, PostInput::from(&post))?.into_response())
}

pub async fn post_edit_post(
    state: &AppState,
    props: &HashMap<String, String>,
    request: Request,
) -> Result<Response, AppError> {
    let Some(id) = post_id(props) else {
        return not_found(&state.routes);
    };
    let input: PostInput = match read_form(request).await {
        Ok(input) => input,
        Err(rejection) => return Ok(rejection),
    };
    if let Err(error) = input.validate() {
        return Ok(PostForm::edit(state, id, input)?.rejected(error));
    }
    let Some(post) = update_post(&state.pool, id, &input).await? else {
        return not_found(&state.routes);
    };
    info!("updated post {}", post.id);
    Ok(Redirect::to(&post_href(&state.routes, "post", post.id)?).into_response())
}
