// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use axum::{response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "API server is running"
    }))
}
