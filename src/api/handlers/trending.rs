// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::TrendingTopic;
use crate::store::DynStorage;

const DEFAULT_REGION: &str = "global";
const DEFAULT_TOPIC_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub region: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_topics(
    State(store): State<DynStorage>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<TrendingTopic>>> {
    let region = params.region.as_deref().unwrap_or(DEFAULT_REGION);
    let limit = params.limit.unwrap_or(DEFAULT_TOPIC_LIMIT);
    Ok(Json(store.list_trending_topics(region, limit).await?))
}
