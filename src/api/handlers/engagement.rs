// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::ActorBody;
use crate::error::Result;
use crate::store::DynStorage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetweetBody {
    pub user_id: String,
    pub comment: Option<String>,
}

pub async fn toggle_like(
    State(store): State<DynStorage>,
    Path(post_id): Path<String>,
    Json(body): Json<ActorBody>,
) -> Result<Json<Value>> {
    let liked = store.toggle_like(&body.user_id, &post_id).await?;
    debug!(user_id = %body.user_id, post_id = %post_id, liked, "toggled like");
    Ok(Json(json!({ "liked": liked })))
}

pub async fn toggle_bookmark(
    State(store): State<DynStorage>,
    Path(post_id): Path<String>,
    Json(body): Json<ActorBody>,
) -> Result<Json<Value>> {
    let bookmarked = store.toggle_bookmark(&body.user_id, &post_id).await?;
    Ok(Json(json!({ "bookmarked": bookmarked })))
}

pub async fn toggle_retweet(
    State(store): State<DynStorage>,
    Path(post_id): Path<String>,
    Json(body): Json<RetweetBody>,
) -> Result<Json<Value>> {
    let retweeted = store
        .toggle_retweet(&body.user_id, &post_id, body.comment)
        .await?;
    Ok(Json(json!({ "retweeted": retweeted })))
}
