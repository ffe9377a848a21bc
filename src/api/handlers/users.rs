// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{PageParams, SearchParams};
use crate::error::{Error, Result};
use crate::models::{NewUser, PostView, User, UserUpdate};
use crate::store::{DynStorage, SUGGESTION_LIMIT};

pub async fn create_user(
    State(store): State<DynStorage>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    if new.username.trim().is_empty() || new.name.trim().is_empty() {
        return Err(Error::invalid("username and name required"));
    }
    let user = store.create_user(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(store.get_user(&id).await?))
}

pub async fn update_user(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>> {
    Ok(Json(store.update_user(&id, update).await?))
}

pub async fn search_users(
    State(store): State<DynStorage>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(store.search_users(params.query()?).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowBody {
    pub follower_id: String,
}

pub async fn toggle_follow(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
    Json(body): Json<FollowBody>,
) -> Result<Json<Value>> {
    let following = store.toggle_follow(&body.follower_id, &id).await?;
    debug!(follower_id = %body.follower_id, following_id = %id, following, "toggled follow");
    Ok(Json(json!({ "following": following })))
}

pub async fn followers(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Vec<User>>> {
    store.get_user(&id).await?;
    Ok(Json(store.followers(&id).await?))
}

pub async fn following(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Vec<User>>> {
    store.get_user(&id).await?;
    Ok(Json(store.following(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub limit: Option<usize>,
}

pub async fn suggested(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<User>>> {
    store.get_user(&id).await?;
    let limit = params.limit.unwrap_or(SUGGESTION_LIMIT);
    Ok(Json(store.suggest_users(&id, limit).await?))
}

pub async fn list_user_posts(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PostView>>> {
    store.get_user(&id).await?;
    Ok(Json(store.list_user_posts(&id, page.limit()).await?))
}

pub async fn user_likes(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PostView>>> {
    store.get_user(&id).await?;
    Ok(Json(store.user_likes(&id).await?))
}

pub async fn user_bookmarks(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PostView>>> {
    store.get_user(&id).await?;
    Ok(Json(store.user_bookmarks(&id).await?))
}

pub async fn user_retweets(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PostView>>> {
    store.get_user(&id).await?;
    Ok(Json(store.user_retweets(&id).await?))
}
