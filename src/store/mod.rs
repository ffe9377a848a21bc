// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod memory;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Conversation, ConversationView, DirectMessage, MessageView, NewMessage, NewNotification,
    NewPost, NewUser, Notification, NotificationView, Post, PostView, TrendingTopic, User,
    UserUpdate,
};

pub use memory::MemoryStore;

/// Default page size for list operations.
pub const DEFAULT_LIMIT: usize = 50;
/// Default number of follow suggestions.
pub const SUGGESTION_LIMIT: usize = 10;

pub type DynStorage = Arc<dyn Storage>;

/// Narrow storage contract the API layer is written against. Toggles are
/// single operations: the existence check and the edge mutation happen
/// inside the backend, so callers never race between checking and acting.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn get_user(&self, id: &str) -> Result<User>;
    async fn get_user_by_username(&self, username: &str) -> Result<User>;
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<User>;
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;

    // Posts
    async fn list_posts(&self, limit: usize, offset: usize) -> Result<Vec<PostView>>;
    async fn get_post(&self, id: &str) -> Result<PostView>;
    async fn create_post(&self, post: NewPost) -> Result<Post>;
    async fn list_user_posts(&self, author_id: &str, limit: usize) -> Result<Vec<PostView>>;
    async fn list_replies(&self, parent_id: &str) -> Result<Vec<PostView>>;
    async fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<PostView>>;
    async fn trending_posts(&self) -> Result<Vec<PostView>>;

    // Likes
    async fn toggle_like(&self, user_id: &str, post_id: &str) -> Result<bool>;
    async fn is_liked(&self, user_id: &str, post_id: &str) -> Result<bool>;
    async fn user_likes(&self, user_id: &str) -> Result<Vec<PostView>>;

    // Bookmarks
    async fn toggle_bookmark(&self, user_id: &str, post_id: &str) -> Result<bool>;
    async fn is_bookmarked(&self, user_id: &str, post_id: &str) -> Result<bool>;
    async fn user_bookmarks(&self, user_id: &str) -> Result<Vec<PostView>>;

    // Retweets
    async fn toggle_retweet(
        &self,
        user_id: &str,
        post_id: &str,
        comment: Option<String>,
    ) -> Result<bool>;
    async fn is_retweeted(&self, user_id: &str, post_id: &str) -> Result<bool>;
    async fn user_retweets(&self, user_id: &str) -> Result<Vec<PostView>>;

    // Social graph
    async fn toggle_follow(&self, follower_id: &str, following_id: &str) -> Result<bool>;
    async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool>;
    async fn followers(&self, user_id: &str) -> Result<Vec<User>>;
    async fn following(&self, user_id: &str) -> Result<Vec<User>>;
    async fn suggest_users(&self, user_id: &str, limit: usize) -> Result<Vec<User>>;

    // Notifications
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;
    async fn list_notifications(&self, user_id: &str, limit: usize)
        -> Result<Vec<NotificationView>>;
    async fn mark_notification_read(&self, id: &str) -> Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<bool>;
    async fn unread_count(&self, user_id: &str) -> Result<i64>;

    // Messaging
    async fn get_or_create_conversation(&self, participant_ids: &[String]) -> Result<Conversation>;
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationView>>;
    async fn send_message(&self, message: NewMessage) -> Result<DirectMessage>;
    async fn list_messages(&self, conversation_id: &str, limit: usize) -> Result<Vec<MessageView>>;
    async fn mark_messages_read(&self, conversation_id: &str, user_id: &str) -> Result<bool>;

    // Trending topics (maintained out-of-band, read-only here)
    async fn list_trending_topics(&self, region: &str, limit: usize) -> Result<Vec<TrendingTopic>>;
}
