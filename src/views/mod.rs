use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use askama::Template;
use axum::{
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::Form;
use log::debug;
use serde::de::DeserializeOwned;

use crate::{
    routes::{Page, RouteTable},
    AppError, AppState,
};

mod home;
mod post;

/// Links every page layout renders in its header.
pub struct Nav {
    pub home: String,
    pub create: String,
    pub stylesheet: String,
}

impl Nav {
    pub fn new(routes: &RouteTable) -> Result<Self> {
        Ok(Nav {
            home: routes.href("home", &[])?,
            create: routes.href("create", &[])?,
            stylesheet: format!("{}/static/style.css", routes.base()),
        })
    }
}

#[derive(Template)]
#[template(path = "not-found.html")]
pub struct NotFound {
    nav: Nav,
}

pub fn not_found(routes: &RouteTable) -> Result<Response, AppError> {
    Ok((
        StatusCode::NOT_FOUND,
        NotFound {
            nav: Nav::new(routes)?,
        },
    )
        .into_response())
}

pub fn post_id(props: &HashMap<String, String>) -> Option<i64> {
    props.get("id")?.parse().ok()
}

pub fn post_href(routes: &RouteTable, name: &str, id: i64) -> Result<String> {
    routes.href(name, &[("id", &id.to_string())])
}

/// Decodes a urlencoded form body, handing back the rejection response on failure.
pub async fn read_form<T: DeserializeOwned>(request: Request) -> Result<T, Response> {
    match Form::<T>::from_request(request, &()).await {
        Ok(Form(value)) => Ok(value),
        Err(rejection) => Err(rejection.into_response()),
    }
}

/// Page fallback: resolves the request URL through the route table and hands it to
/// the page bound to the matched route.
#[axum::debug_handler]
pub async fn dispatch(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let uri = request.uri().to_string();
    let Some(matched) = state.routes.resolve(&uri) else {
        debug!("no route for {}", uri);
        return not_found(&state.routes);
    };
    let method = request.method().clone();
    debug!("{} {} -> {}", method, uri, matched.name());

    let props = matched.props();
    let verb = match method.as_str() {
        "HEAD" => "GET",
        other => other,
    };
    match (matched.page(), verb) {
        (Page::Home, "GET") => home::post_list::view_post_list(&state).await,
        (Page::Post, "GET") => post::details::view_post_details(&state, &props).await,
        (Page::Post, "POST") => post::details::post_post_action(&state, &props, request).await,
        (Page::Create, "GET") => post::editor::view_create_post(&state),
        (Page::Create, "POST") => post::editor::post_create_post(&state, request).await,
        (Page::Edit, "GET") => post::editor::view_edit_post(&state, &props).await,
        (Page::Edit, "POST") => post::editor::post_edit_post(&state, &props, request).await,
        (page, _) => Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, allowed_methods(page))],
        )
            .into_response()),
    }
}

fn allowed_methods(page: Page) -> &'static str {
    match page {
        Page::Home => "GET, HEAD",
        Page::Post | Page::Create | Page::Edit => "GET, HEAD, POST",
    }
}
