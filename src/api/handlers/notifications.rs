// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use super::PageParams;
use crate::error::Result;
use crate::models::NotificationView;
use crate::store::DynStorage;

pub async fn list_notifications(
    State(store): State<DynStorage>,
    Path(user_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<NotificationView>>> {
    store.get_user(&user_id).await?;
    Ok(Json(
        store.list_notifications(&user_id, page.limit()).await?,
    ))
}

pub async fn unread_count(
    State(store): State<DynStorage>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    store.get_user(&user_id).await?;
    let count = store.unread_count(&user_id).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn mark_read(
    State(store): State<DynStorage>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let success = store.mark_notification_read(&id).await?;
    Ok(Json(json!({ "success": success })))
}

pub async fn mark_all_read(
    State(store): State<DynStorage>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let success = store.mark_all_notifications_read(&user_id).await?;
    Ok(Json(json!({ "success": success })))
}
