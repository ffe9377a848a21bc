// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

mod handlers;

use anyhow::Result;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::store::DynStorage;

/// Build the full route table over a storage backend.
pub fn router(store: DynStorage) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Posts
        .route("/api/posts", get(handlers::posts::list_posts).post(handlers::posts::create_post))
        .route("/api/posts/trending", get(handlers::posts::trending_posts))
        .route("/api/posts/search", get(handlers::posts::search_posts))
        .route("/api/posts/:id", get(handlers::posts::get_post))
        .route("/api/posts/:id/replies", get(handlers::posts::list_replies))
        .route("/api/posts/:id/like", post(handlers::engagement::toggle_like))
        .route("/api/posts/:id/bookmark", post(handlers::engagement::toggle_bookmark))
        .route("/api/posts/:id/retweet", post(handlers::engagement::toggle_retweet))
        // Users
        .route("/api/users", post(handlers::users::create_user))
        .route("/api/users/search", get(handlers::users::search_users))
        .route(
            "/api/users/:id",
            get(handlers::users::get_user).patch(handlers::users::update_user),
        )
        .route("/api/users/:id/posts", get(handlers::users::list_user_posts))
        .route("/api/users/:id/likes", get(handlers::users::user_likes))
        .route("/api/users/:id/bookmarks", get(handlers::users::user_bookmarks))
        .route("/api/users/:id/retweets", get(handlers::users::user_retweets))
        .route("/api/users/:id/follow", post(handlers::users::toggle_follow))
        .route("/api/users/:id/followers", get(handlers::users::followers))
        .route("/api/users/:id/following", get(handlers::users::following))
        .route("/api/users/:id/suggested", get(handlers::users::suggested))
        .route(
            "/api/users/:id/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/users/:id/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/api/users/:id/notifications/read",
            patch(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/users/:id/conversations",
            get(handlers::messages::list_conversations),
        )
        // Notifications
        .route(
            "/api/notifications/:id/read",
            patch(handlers::notifications::mark_read),
        )
        // Conversations
        .route("/api/conversations", post(handlers::messages::get_or_create_conversation))
        .route(
            "/api/conversations/:id/messages",
            get(handlers::messages::list_messages).post(handlers::messages::send_message),
        )
        .route(
            "/api/conversations/:id/read",
            patch(handlers::messages::mark_messages_read),
        )
        // Trending topics
        .route("/api/trending", get(handlers::trending::list_topics))
        .with_state(store)
}

/// Start the API server and serve until the task is cancelled.
pub async fn serve(store: DynStorage) -> Result<()> {
    let config = Config::get();

    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    let app = router(store)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port).parse::<SocketAddr>()?;

    info!("starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
