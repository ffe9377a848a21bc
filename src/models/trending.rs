// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Curated trending entry, maintained out-of-band and read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTopic {
    pub id: String,
    pub topic: String,
    pub category: String,
    pub tweet_count: i64,
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hashtag {
    pub id: String,
    /// Lowercase, without the leading '#'.
    pub tag: String,
    pub use_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHashtag {
    pub id: String,
    pub post_id: String,
    pub hashtag_id: String,
    pub created_at: DateTime<Utc>,
}
