// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use tracing::info;

use super::{MemoryStore, Storage};
use crate::error::Result;
use crate::models::{NewPost, NewUser};

/// Load a small set of demo users, posts, and trending topics so a fresh
/// server has something to serve. Controlled by `SEED_DEMO_DATA`.
pub async fn load_demo_data(store: &MemoryStore) -> Result<()> {
    let sarah = store
        .create_user(NewUser {
            username: "sarahjohnson".to_string(),
            name: "Sarah Johnson".to_string(),
            email: Some("sarah@example.com".to_string()),
            avatar: None,
            bio: Some("Backend developer, distributed systems".to_string()),
            location: Some("San Francisco, CA".to_string()),
            website: Some("https://sarahjohnson.dev".to_string()),
            verified: false,
        })
        .await?;

    let alex = store
        .create_user(NewUser {
            username: "alexchen".to_string(),
            name: "Alex Chen".to_string(),
            email: Some("alex@example.com".to_string()),
            avatar: None,
            bio: Some("Full-stack engineer building the future".to_string()),
            location: Some("New York, NY".to_string()),
            website: None,
            verified: false,
        })
        .await?;

    let emma = store
        .create_user(NewUser {
            username: "emmarodriguez".to_string(),
            name: "Emma Rodriguez".to_string(),
            email: Some("emma@example.com".to_string()),
            avatar: None,
            bio: Some("UX designer, accessibility advocate".to_string()),
            location: Some("Austin, TX".to_string()),
            website: Some("https://emmarodriguez.design".to_string()),
            verified: true,
        })
        .await?;

    store
        .create_post(NewPost {
            author_id: alex.id.clone(),
            content: "Rewrote our feed aggregation in Rust this week. The type \
                      system caught three counter bugs before they shipped. #rust #backend"
                .to_string(),
            parent_post_id: None,
            images: None,
            video: None,
            gif: None,
            poll: None,
        })
        .await?;

    let dark_mode = store
        .create_post(NewPost {
            author_id: emma.id.clone(),
            content: "The new dark mode contrast ratios finally pass every \
                      accessibility check. #darkmode #design"
                .to_string(),
            parent_post_id: None,
            images: None,
            video: None,
            gif: None,
            poll: None,
        })
        .await?;

    store
        .create_post(NewPost {
            author_id: sarah.id.clone(),
            content: "Looks great on my lock screen already!".to_string(),
            parent_post_id: Some(dark_mode.id.clone()),
            images: None,
            video: None,
            gif: None,
            poll: None,
        })
        .await?;

    store.toggle_follow(&sarah.id, &emma.id).await?;
    store.toggle_follow(&alex.id, &emma.id).await?;
    store.toggle_like(&sarah.id, &dark_mode.id).await?;

    store
        .add_trending_topic("#rust", "Technology", 42_100, "global")
        .await;
    store
        .add_trending_topic("#darkmode", "Design", 15_700, "global")
        .await;
    store
        .add_trending_topic("Feed Ranking", "Technology", 8_300, "global")
        .await;

    info!("demo data seeded");
    Ok(())
}
