// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author_id: String,
    /// Set when this post is a reply to another post.
    pub parent_post_id: Option<String>,
    // Media attachments, opaque to this core
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub gif: Option<String>,
    pub poll: Option<serde_json::Value>,
    // Denormalized engagement counters
    pub likes: i64,
    pub retweets: i64,
    pub replies: i64,
    pub views: i64,
    // Carried on the wire for client compatibility; never set by this core.
    // Quote-retweets live on the Retweet edge as a comment instead.
    pub is_retweet: bool,
    pub retweet_of_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub author_id: String,
    pub content: String,
    pub parent_post_id: Option<String>,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub gif: Option<String>,
    pub poll: Option<serde_json::Value>,
}

/// A post joined with its resolved author, the shape every listing returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
}
