// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use super::{PageParams, SearchParams};
use crate::error::{Error, Result};
use crate::models::{NewPost, Post, PostView};
use crate::store::DynStorage;

/// Maximum post length, enforced at the edge.
const MAX_CONTENT_CHARS: usize = 280;

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::invalid("post content must not be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(Error::invalid(format!(
            "post content exceeds {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

pub async fn list_posts(
    State(store): State<DynStorage>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PostView>>> {
    debug!(limit = page.limit(), offset = page.offset(), "listing posts");
    Ok(Json(store.list_posts(page.limit(), page.offset()).await?))
}

pub async fn get_post(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<PostView>> {
    Ok(Json(store.get_post(&id).await?))
}

pub async fn create_post(
    State(store): State<DynStorage>,
    Json(new): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>)> {
    if new.author_id.trim().is_empty() {
        return Err(Error::invalid("author id required"));
    }
    validate_content(&new.content)?;

    let post = store.create_post(new).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_replies(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PostView>>> {
    Ok(Json(store.list_replies(&id).await?))
}

pub async fn search_posts(
    State(store): State<DynStorage>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PostView>>> {
    let query = params.query()?;
    debug!(query, "searching posts");
    Ok(Json(store.search_posts(query, crate::store::DEFAULT_LIMIT).await?))
}

pub async fn trending_posts(State(store): State<DynStorage>) -> Result<Json<Vec<PostView>>> {
    Ok(Json(store.trending_posts().await?))
}
