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

use super::{ActorBody, PageParams};
use crate::error::{Error, Result};
use crate::models::{Conversation, ConversationView, DirectMessage, MessageView, NewMessage};
use crate::store::DynStorage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationBody {
    pub participant_ids: Vec<String>,
}

pub async fn get_or_create_conversation(
    State(store): State<DynStorage>,
    Json(body): Json<ConversationBody>,
) -> Result<Json<Conversation>> {
    let conversation = store.get_or_create_conversation(&body.participant_ids).await?;
    debug!(conversation_id = %conversation.id, "resolved conversation");
    Ok(Json(conversation))
}

pub async fn list_conversations(
    State(store): State<DynStorage>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ConversationView>>> {
    store.get_user(&user_id).await?;
    Ok(Json(store.list_conversations(&user_id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub sender_id: String,
    pub content: String,
    pub images: Option<Vec<String>>,
}

pub async fn send_message(
    State(store): State<DynStorage>,
    Path(conversation_id): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<DirectMessage>)> {
    if body.content.trim().is_empty() {
        return Err(Error::invalid("message content must not be empty"));
    }

    let message = store
        .send_message(NewMessage {
            conversation_id,
            sender_id: body.sender_id,
            content: body.content,
            images: body.images,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(store): State<DynStorage>,
    Path(conversation_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<MessageView>>> {
    Ok(Json(
        store.list_messages(&conversation_id, page.limit()).await?,
    ))
}

pub async fn mark_messages_read(
    State(store): State<DynStorage>,
    Path(conversation_id): Path<String>,
    Json(body): Json<ActorBody>,
) -> Result<Json<Value>> {
    let success = store
        .mark_messages_read(&conversation_id, &body.user_id)
        .await?;
    Ok(Json(json!({ "success": success })))
}
