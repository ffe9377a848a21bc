// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::Storage;
use crate::error::{Error, Result};
use crate::models::{
    Bookmark, Conversation, ConversationParticipant, ConversationView, DirectMessage, Follow,
    Hashtag, Like, MessageView, NewMessage, NewNotification, NewPost, NewUser, Notification,
    NotificationKind, NotificationView, ParticipantView, Post, PostHashtag, PostView, Retweet,
    TrendingTopic, User, UserUpdate,
};

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").unwrap());

/// How many users a search returns at most.
const USER_SEARCH_LIMIT: usize = 20;
/// Trending feed: window, cap, and score weights.
const TRENDING_WINDOW_HOURS: i64 = 24;
const TRENDING_LIMIT: usize = 50;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// All tables, guarded by a single lock. Every toggle runs its existence
/// check, edge mutation, counter update, and notification emission under
/// one write guard, so counters cannot drift from edge cardinality.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    likes: Vec<Like>,
    bookmarks: Vec<Bookmark>,
    retweets: Vec<Retweet>,
    follows: Vec<Follow>,
    notifications: Vec<Notification>,
    conversations: Vec<Conversation>,
    participants: Vec<ConversationParticipant>,
    messages: Vec<DirectMessage>,
    trending_topics: Vec<TrendingTopic>,
    hashtags: Vec<Hashtag>,
    post_hashtags: Vec<PostHashtag>,
}

impl Tables {
    fn user(&self, id: &str) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(Error::NotFound("user"))
    }

    fn user_mut(&mut self, id: &str) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(Error::NotFound("user"))
    }

    fn post(&self, id: &str) -> Result<&Post> {
        self.posts
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::NotFound("post"))
    }

    fn post_mut(&mut self, id: &str) -> Result<&mut Post> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::NotFound("post"))
    }

    fn conversation(&self, id: &str) -> Result<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.id == id)
            .ok_or(Error::NotFound("conversation"))
    }

    fn post_view(&self, post: &Post) -> Result<PostView> {
        let author = self.user(&post.author_id)?.clone();
        Ok(PostView {
            post: post.clone(),
            author,
        })
    }

    /// Posts are never deleted, so every edge still resolves; a failure here
    /// means a referential-integrity bug, surfaced as Internal by callers.
    fn post_views<'a, I>(&self, posts: I) -> Result<Vec<PostView>>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        posts.into_iter().map(|p| self.post_view(p)).collect()
    }

    /// Record a notification for `user_id` caused by `from`. Actions a user
    /// takes on their own content notify nobody.
    fn notify(
        &mut self,
        user_id: &str,
        from: &str,
        kind: NotificationKind,
        entity_id: Option<String>,
    ) {
        if user_id == from {
            return;
        }
        self.notifications.push(Notification {
            id: new_id(),
            user_id: user_id.to_string(),
            from_user_id: Some(from.to_string()),
            kind,
            entity_id,
            read: false,
            created_at: Utc::now(),
        });
    }
}

/// Upsert every `#tag` occurrence in `content` and link each tag to the
/// post. Use counts track occurrences; the (post, hashtag) link is unique.
fn extract_hashtags(tables: &mut Tables, post_id: &str, content: &str) -> Result<()> {
    for capture in HASHTAG_RE.captures_iter(content) {
        let tag = capture[1].to_lowercase();
        let hashtag_id = match tables.hashtags.iter_mut().find(|h| h.tag == tag) {
            Some(existing) => {
                existing.use_count += 1;
                existing.id.clone()
            }
            None => {
                let hashtag = Hashtag {
                    id: new_id(),
                    tag,
                    use_count: 1,
                    created_at: Utc::now(),
                };
                let id = hashtag.id.clone();
                tables.hashtags.push(hashtag);
                id
            }
        };

        let already_linked = tables
            .post_hashtags
            .iter()
            .any(|ph| ph.post_id == post_id && ph.hashtag_id == hashtag_id);
        if !already_linked {
            tables.post_hashtags.push(PostHashtag {
                id: new_id(),
                post_id: post_id.to_string(),
                hashtag_id,
                created_at: Utc::now(),
            });
        }
    }

    Ok(())
}

fn trending_score(post: &Post) -> f64 {
    post.likes as f64 + post.retweets as f64 * 2.0 + post.replies as f64 * 1.5
}

/// In-memory `Storage` backend. Tables live behind one `RwLock`; reads take
/// the shared guard, every mutation the exclusive one.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Trending topics are curated out-of-band; this is the maintenance
    /// entry point the seeder uses.
    pub async fn add_trending_topic(
        &self,
        topic: &str,
        category: &str,
        tweet_count: i64,
        region: &str,
    ) -> TrendingTopic {
        let entry = TrendingTopic {
            id: new_id(),
            topic: topic.to_string(),
            category: category.to_string(),
            tweet_count,
            region: region.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .trending_topics
            .push(entry.clone());
        entry
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    // ---- Users ----

    async fn get_user(&self, id: &str) -> Result<User> {
        Ok(self.tables.read().await.user(id)?.clone())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(Error::NotFound("user"))
    }

    async fn create_user(&self, new: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == new.username) {
            return Err(Error::invalid(format!(
                "username '{}' is already taken",
                new.username
            )));
        }

        let now = Utc::now();
        let user = User {
            id: new_id(),
            username: new.username,
            name: new.name,
            email: new.email,
            avatar: new.avatar,
            header_image: None,
            verified: new.verified,
            bio: new.bio,
            location: new.location,
            website: new.website,
            following: 0,
            followers: 0,
            tweets_count: 0,
            joined_at: now,
            created_at: now,
        };
        tables.users.push(user.clone());
        debug!(user_id = %user.id, username = %user.username, "created user");
        Ok(user)
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables.user_mut(id)?;

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(header_image) = update.header_image {
            user.header_image = Some(header_image);
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(location) = update.location {
            user.location = Some(location);
        }
        if let Some(website) = update.website {
            user.website = Some(website);
        }
        if let Some(verified) = update.verified {
            user.verified = verified;
        }

        Ok(user.clone())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let query = query.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&query)
                    || u.username.to_lowercase().contains(&query)
                    || u.bio
                        .as_deref()
                        .map(|b| b.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .take(USER_SEARCH_LIMIT)
            .cloned()
            .collect())
    }

    // ---- Posts ----

    async fn list_posts(&self, limit: usize, offset: usize) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tables.post_views(posts.into_iter().skip(offset).take(limit))
    }

    async fn get_post(&self, id: &str) -> Result<PostView> {
        let tables = self.tables.read().await;
        let post = tables.post(id)?;
        tables.post_view(post)
    }

    async fn create_post(&self, new: NewPost) -> Result<Post> {
        let mut tables = self.tables.write().await;
        tables.user(&new.author_id)?;

        // A reply's parent must exist; grab its author for the notification.
        let parent_author = match &new.parent_post_id {
            Some(parent_id) => Some(tables.post(parent_id)?.author_id.clone()),
            None => None,
        };

        // Mentioned usernames resolve to users before any mutation.
        let mentioned: Vec<String> = {
            let names: HashSet<String> =
                MENTION_RE.captures_iter(&new.content).map(|c| c[1].to_string()).collect();
            tables
                .users
                .iter()
                .filter(|u| names.contains(&u.username) && u.id != new.author_id)
                .map(|u| u.id.clone())
                .collect()
        };

        let post = Post {
            id: new_id(),
            content: new.content,
            author_id: new.author_id.clone(),
            parent_post_id: new.parent_post_id,
            images: new.images,
            video: new.video,
            gif: new.gif,
            poll: new.poll,
            likes: 0,
            retweets: 0,
            replies: 0,
            views: 0,
            is_retweet: false,
            retweet_of_id: None,
            created_at: Utc::now(),
        };
        tables.posts.push(post.clone());

        tables.user_mut(&new.author_id)?.tweets_count += 1;

        if let Some(parent_id) = post.parent_post_id.clone() {
            tables.post_mut(&parent_id)?.replies += 1;
            if let Some(parent_author) = parent_author {
                tables.notify(
                    &parent_author,
                    &post.author_id,
                    NotificationKind::Reply,
                    Some(post.id.clone()),
                );
            }
        }

        for user_id in mentioned {
            tables.notify(
                &user_id,
                &post.author_id,
                NotificationKind::Mention,
                Some(post.id.clone()),
            );
        }

        // Best-effort: a hashtag failure must not fail the post.
        if let Err(e) = extract_hashtags(&mut tables, &post.id, &post.content) {
            warn!(post_id = %post.id, "hashtag extraction failed: {}", e);
        }

        debug!(post_id = %post.id, author_id = %post.author_id, "created post");
        Ok(post)
    }

    async fn list_user_posts(&self, author_id: &str, limit: usize) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tables.post_views(posts.into_iter().take(limit))
    }

    async fn list_replies(&self, parent_id: &str) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| p.parent_post_id.as_deref() == Some(parent_id))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tables.post_views(posts)
    }

    async fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<PostView>> {
        let query = query.to_lowercase();
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| p.content.to_lowercase().contains(&query))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tables.post_views(posts.into_iter().take(limit))
    }

    async fn trending_posts(&self) -> Result<Vec<PostView>> {
        let cutoff = Utc::now() - Duration::hours(TRENDING_WINDOW_HOURS);
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| p.created_at > cutoff)
            .collect();
        // Highest score first; equal scores fall back to newest first.
        posts.sort_by(|a, b| {
            trending_score(b)
                .partial_cmp(&trending_score(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        tables.post_views(posts.into_iter().take(TRENDING_LIMIT))
    }

    // ---- Likes ----

    async fn toggle_like(&self, user_id: &str, post_id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.user(user_id)?;
        let author_id = tables.post(post_id)?.author_id.clone();

        let existing = tables
            .likes
            .iter()
            .position(|l| l.user_id == user_id && l.post_id == post_id);

        match existing {
            Some(index) => {
                tables.likes.remove(index);
                let post = tables.post_mut(post_id)?;
                post.likes = (post.likes - 1).max(0);
                Ok(false)
            }
            None => {
                tables.likes.push(Like {
                    id: new_id(),
                    user_id: user_id.to_string(),
                    post_id: post_id.to_string(),
                    created_at: Utc::now(),
                });
                tables.post_mut(post_id)?.likes += 1;
                tables.notify(
                    &author_id,
                    user_id,
                    NotificationKind::Like,
                    Some(post_id.to_string()),
                );
                Ok(true)
            }
        }
    }

    async fn is_liked(&self, user_id: &str, post_id: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .await
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.post_id == post_id))
    }

    async fn user_likes(&self, user_id: &str) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut edges: Vec<&Like> = tables
            .likes
            .iter()
            .filter(|l| l.user_id == user_id)
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        edges
            .into_iter()
            .map(|l| tables.post_view(tables.post(&l.post_id)?))
            .collect()
    }

    // ---- Bookmarks ----

    async fn toggle_bookmark(&self, user_id: &str, post_id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.user(user_id)?;
        tables.post(post_id)?;

        let existing = tables
            .bookmarks
            .iter()
            .position(|b| b.user_id == user_id && b.post_id == post_id);

        // Posts carry no bookmark counter, so the toggle is edge-only.
        match existing {
            Some(index) => {
                tables.bookmarks.remove(index);
                Ok(false)
            }
            None => {
                tables.bookmarks.push(Bookmark {
                    id: new_id(),
                    user_id: user_id.to_string(),
                    post_id: post_id.to_string(),
                    created_at: Utc::now(),
                });
                Ok(true)
            }
        }
    }

    async fn is_bookmarked(&self, user_id: &str, post_id: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .await
            .bookmarks
            .iter()
            .any(|b| b.user_id == user_id && b.post_id == post_id))
    }

    async fn user_bookmarks(&self, user_id: &str) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut edges: Vec<&Bookmark> = tables
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        edges
            .into_iter()
            .map(|b| tables.post_view(tables.post(&b.post_id)?))
            .collect()
    }

    // ---- Retweets ----

    async fn toggle_retweet(
        &self,
        user_id: &str,
        post_id: &str,
        comment: Option<String>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.user(user_id)?;
        let author_id = tables.post(post_id)?.author_id.clone();

        let existing = tables
            .retweets
            .iter()
            .position(|r| r.user_id == user_id && r.post_id == post_id);

        match existing {
            Some(index) => {
                tables.retweets.remove(index);
                let post = tables.post_mut(post_id)?;
                post.retweets = (post.retweets - 1).max(0);
                Ok(false)
            }
            None => {
                tables.retweets.push(Retweet {
                    id: new_id(),
                    user_id: user_id.to_string(),
                    post_id: post_id.to_string(),
                    comment,
                    created_at: Utc::now(),
                });
                tables.post_mut(post_id)?.retweets += 1;
                tables.notify(
                    &author_id,
                    user_id,
                    NotificationKind::Retweet,
                    Some(post_id.to_string()),
                );
                Ok(true)
            }
        }
    }

    async fn is_retweeted(&self, user_id: &str, post_id: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .await
            .retweets
            .iter()
            .any(|r| r.user_id == user_id && r.post_id == post_id))
    }

    async fn user_retweets(&self, user_id: &str) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut edges: Vec<&Retweet> = tables
            .retweets
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        edges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        edges
            .into_iter()
            .map(|r| tables.post_view(tables.post(&r.post_id)?))
            .collect()
    }

    // ---- Social graph ----

    async fn toggle_follow(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        if follower_id == following_id {
            return Err(Error::invalid("cannot follow yourself"));
        }

        let mut tables = self.tables.write().await;
        tables.user(follower_id)?;
        tables.user(following_id)?;

        let existing = tables
            .follows
            .iter()
            .position(|f| f.follower_id == follower_id && f.following_id == following_id);

        match existing {
            Some(index) => {
                tables.follows.remove(index);
                let follower = tables.user_mut(follower_id)?;
                follower.following = (follower.following - 1).max(0);
                let following = tables.user_mut(following_id)?;
                following.followers = (following.followers - 1).max(0);
                Ok(false)
            }
            None => {
                tables.follows.push(Follow {
                    id: new_id(),
                    follower_id: follower_id.to_string(),
                    following_id: following_id.to_string(),
                    created_at: Utc::now(),
                });
                tables.user_mut(follower_id)?.following += 1;
                tables.user_mut(following_id)?.followers += 1;
                tables.notify(following_id, follower_id, NotificationKind::Follow, None);
                Ok(true)
            }
        }
    }

    async fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .await
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.following_id == following_id))
    }

    async fn followers(&self, user_id: &str) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        tables
            .follows
            .iter()
            .filter(|f| f.following_id == user_id)
            .map(|f| tables.user(&f.follower_id).cloned())
            .collect()
    }

    async fn following(&self, user_id: &str) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        tables
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| tables.user(&f.following_id).cloned())
            .collect()
    }

    async fn suggest_users(&self, user_id: &str, limit: usize) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut excluded: HashSet<&str> = tables
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id.as_str())
            .collect();
        excluded.insert(user_id);

        let mut candidates: Vec<&User> = tables
            .users
            .iter()
            .filter(|u| !excluded.contains(u.id.as_str()))
            .collect();
        // Stable sort keeps insertion order among equally popular users.
        candidates.sort_by(|a, b| b.followers.cmp(&a.followers));
        Ok(candidates.into_iter().take(limit).cloned().collect())
    }

    // ---- Notifications ----

    async fn create_notification(&self, new: NewNotification) -> Result<Notification> {
        let mut tables = self.tables.write().await;
        tables.user(&new.user_id)?;

        let notification = Notification {
            id: new_id(),
            user_id: new.user_id,
            from_user_id: new.from_user_id,
            kind: new.kind,
            entity_id: new.entity_id,
            read: false,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<NotificationView>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|n| NotificationView {
                notification: n.clone(),
                from_user: n
                    .from_user_id
                    .as_deref()
                    .and_then(|id| tables.user(id).ok().cloned()),
            })
            .collect())
    }

    async fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let mut changed = false;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            changed = true;
        }
        Ok(changed)
    }

    async fn unread_count(&self, user_id: &str) -> Result<i64> {
        Ok(self
            .tables
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    // ---- Messaging ----

    async fn get_or_create_conversation(&self, participant_ids: &[String]) -> Result<Conversation> {
        let wanted: BTreeSet<&str> = participant_ids.iter().map(|s| s.as_str()).collect();
        if wanted.len() < 2 {
            return Err(Error::invalid(
                "a conversation needs at least two distinct participants",
            ));
        }

        let mut tables = self.tables.write().await;
        for id in &wanted {
            tables.user(id)?;
        }

        // Match on the unordered participant set.
        for conversation in &tables.conversations {
            let members: BTreeSet<&str> = tables
                .participants
                .iter()
                .filter(|p| p.conversation_id == conversation.id)
                .map(|p| p.user_id.as_str())
                .collect();
            if members == wanted {
                return Ok(conversation.clone());
            }
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: new_id(),
            created_at: now,
            updated_at: now,
        };
        for user_id in &wanted {
            tables.participants.push(ConversationParticipant {
                id: new_id(),
                conversation_id: conversation.id.clone(),
                user_id: user_id.to_string(),
                joined_at: now,
            });
        }
        tables.conversations.push(conversation.clone());
        debug!(conversation_id = %conversation.id, "created conversation");
        Ok(conversation)
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationView>> {
        let tables = self.tables.read().await;
        let mut views = Vec::new();

        for membership in tables.participants.iter().filter(|p| p.user_id == user_id) {
            let conversation = tables.conversation(&membership.conversation_id)?.clone();

            let participants = tables
                .participants
                .iter()
                .filter(|p| p.conversation_id == conversation.id)
                .map(|p| {
                    Ok(ParticipantView {
                        participant: p.clone(),
                        user: tables.user(&p.user_id)?.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let last_message = tables
                .messages
                .iter()
                .filter(|m| m.conversation_id == conversation.id)
                .max_by_key(|m| m.created_at)
                .map(|m| {
                    Ok(MessageView {
                        message: m.clone(),
                        sender: tables.user(&m.sender_id)?.clone(),
                    })
                })
                .transpose()?;

            views.push(ConversationView {
                conversation,
                participants,
                last_message,
            });
        }

        // Most recently active first.
        views.sort_by(|a, b| b.conversation.updated_at.cmp(&a.conversation.updated_at));
        Ok(views)
    }

    async fn send_message(&self, new: NewMessage) -> Result<DirectMessage> {
        let mut tables = self.tables.write().await;
        tables.conversation(&new.conversation_id)?;
        tables.user(&new.sender_id)?;

        let message = DirectMessage {
            id: new_id(),
            conversation_id: new.conversation_id.clone(),
            sender_id: new.sender_id,
            content: new.content,
            images: new.images,
            read: false,
            created_at: Utc::now(),
        };
        tables.messages.push(message.clone());

        if let Some(conversation) = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == new.conversation_id)
        {
            conversation.updated_at = Utc::now();
        }

        Ok(message)
    }

    async fn list_messages(&self, conversation_id: &str, limit: usize) -> Result<Vec<MessageView>> {
        let tables = self.tables.read().await;
        tables.conversation(conversation_id)?;

        let mut rows: Vec<&DirectMessage> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter()
            .take(limit)
            .map(|m| {
                Ok(MessageView {
                    message: m.clone(),
                    sender: tables.user(&m.sender_id)?.clone(),
                })
            })
            .collect()
    }

    async fn mark_messages_read(&self, conversation_id: &str, user_id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.conversation(conversation_id)?;

        let mut changed = false;
        for message in tables.messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.sender_id != user_id && !m.read
        }) {
            message.read = true;
            changed = true;
        }
        Ok(changed)
    }

    // ---- Trending topics ----

    async fn list_trending_topics(&self, region: &str, limit: usize) -> Result<Vec<TrendingTopic>> {
        let tables = self.tables.read().await;
        let mut topics: Vec<&TrendingTopic> = tables
            .trending_topics
            .iter()
            .filter(|t| t.region == region)
            .collect();
        topics.sort_by(|a, b| b.tweet_count.cmp(&a.tweet_count));
        Ok(topics.into_iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(NewUser {
                username: username.to_string(),
                name: username.to_string(),
                email: None,
                avatar: None,
                bio: None,
                location: None,
                website: None,
                verified: false,
            })
            .await
            .unwrap()
    }

    fn text_post(author_id: &str, content: &str) -> NewPost {
        NewPost {
            author_id: author_id.to_string(),
            content: content.to_string(),
            parent_post_id: None,
            images: None,
            video: None,
            gif: None,
            poll: None,
        }
    }

    #[tokio::test]
    async fn hashtags_upsert_across_posts() {
        let store = MemoryStore::new();
        let author = user(&store, "ada").await;

        store
            .create_post(text_post(&author.id, "shipping #Rust today"))
            .await
            .unwrap();
        store
            .create_post(text_post(&author.id, "still on the #rust train"))
            .await
            .unwrap();

        let tables = store.tables.read().await;
        let hashtag = tables.hashtags.iter().find(|h| h.tag == "rust").unwrap();
        assert_eq!(tables.hashtags.len(), 1);
        assert_eq!(hashtag.use_count, 2);
        assert_eq!(tables.post_hashtags.len(), 2);
    }

    #[tokio::test]
    async fn repeated_hashtag_counts_every_occurrence_but_links_once() {
        let store = MemoryStore::new();
        let author = user(&store, "ada").await;

        store
            .create_post(text_post(&author.id, "#foo is great, #Foo forever"))
            .await
            .unwrap();

        let tables = store.tables.read().await;
        let hashtag = tables.hashtags.iter().find(|h| h.tag == "foo").unwrap();
        assert_eq!(hashtag.use_count, 2);
        assert_eq!(tables.post_hashtags.len(), 1);
    }

    #[tokio::test]
    async fn suggestions_exclude_self_and_followed() {
        let store = MemoryStore::new();
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let c = user(&store, "c").await;

        store.toggle_follow(&a.id, &b.id).await.unwrap();

        let suggested = store.suggest_users(&a.id, 10).await.unwrap();
        let ids: Vec<&str> = suggested.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec![c.id.as_str()]);
    }

    #[tokio::test]
    async fn suggestions_rank_by_followers() {
        let store = MemoryStore::new();
        let viewer = user(&store, "viewer").await;
        let quiet = user(&store, "quiet").await;
        let popular = user(&store, "popular").await;
        let fan = user(&store, "fan").await;

        store.toggle_follow(&fan.id, &popular.id).await.unwrap();

        let suggested = store.suggest_users(&viewer.id, 2).await.unwrap();
        assert_eq!(suggested[0].id, popular.id);
        assert_eq!(suggested[1].id, quiet.id);
    }

    #[tokio::test]
    async fn self_follow_rejected() {
        let store = MemoryStore::new();
        let a = user(&store, "a").await;
        assert!(matches!(
            store.toggle_follow(&a.id, &a.id).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn reply_bumps_parent_counter_and_notifies() {
        let store = MemoryStore::new();
        let op = user(&store, "op").await;
        let replier = user(&store, "replier").await;

        let root = store.create_post(text_post(&op.id, "root")).await.unwrap();
        let mut reply = text_post(&replier.id, "reply");
        reply.parent_post_id = Some(root.id.clone());
        store.create_post(reply).await.unwrap();

        assert_eq!(store.get_post(&root.id).await.unwrap().post.replies, 1);
        assert_eq!(store.unread_count(&op.id).await.unwrap(), 1);

        let notifications = store.list_notifications(&op.id, 50).await.unwrap();
        assert_eq!(
            notifications[0].notification.kind,
            NotificationKind::Reply
        );
    }

    #[tokio::test]
    async fn mention_notifies_resolved_users_only() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let friend = user(&store, "friend").await;

        store
            .create_post(text_post(&author.id, "hey @friend and @nobody, also @author"))
            .await
            .unwrap();

        assert_eq!(store.unread_count(&friend.id).await.unwrap(), 1);
        assert_eq!(store.unread_count(&author.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn trending_excludes_posts_older_than_a_day() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let stale = store.create_post(text_post(&author.id, "old news")).await.unwrap();
        let fresh = store.create_post(text_post(&author.id, "fresh")).await.unwrap();

        {
            let mut tables = store.tables.write().await;
            let post = tables.post_mut(&stale.id).unwrap();
            post.created_at = Utc::now() - Duration::hours(25);
        }

        let trending = store.trending_posts().await.unwrap();
        let ids: Vec<&str> = trending.iter().map(|v| v.post.id.as_str()).collect();
        assert_eq!(ids, vec![fresh.id.as_str()]);
    }

    #[tokio::test]
    async fn trending_orders_by_score() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let heavy = store.create_post(text_post(&author.id, "heavy")).await.unwrap();
        let light = store.create_post(text_post(&author.id, "light")).await.unwrap();

        {
            let mut tables = store.tables.write().await;
            // likes=10, retweets=5, replies=2 scores 10 + 10 + 3 = 23
            let post = tables.post_mut(&heavy.id).unwrap();
            post.likes = 10;
            post.retweets = 5;
            post.replies = 2;
            assert_eq!(trending_score(post), 23.0);
            tables.post_mut(&light.id).unwrap().likes = 3;
        }

        let trending = store.trending_posts().await.unwrap();
        assert_eq!(trending[0].post.id, heavy.id);
        assert_eq!(trending[1].post.id, light.id);
    }

    #[tokio::test]
    async fn trending_ties_break_newest_first() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let older = store.create_post(text_post(&author.id, "older")).await.unwrap();
        let newer = store.create_post(text_post(&author.id, "newer")).await.unwrap();

        {
            let mut tables = store.tables.write().await;
            tables.post_mut(&older.id).unwrap().created_at = Utc::now() - Duration::hours(2);
            tables.post_mut(&newer.id).unwrap().created_at = Utc::now() - Duration::hours(1);
        }

        let trending = store.trending_posts().await.unwrap();
        assert_eq!(trending[0].post.id, newer.id);
        assert_eq!(trending[1].post.id, older.id);
    }

    #[tokio::test]
    async fn quote_retweet_keeps_comment_on_edge() {
        let store = MemoryStore::new();
        let author = user(&store, "author").await;
        let quoter = user(&store, "quoter").await;
        let post = store.create_post(text_post(&author.id, "original")).await.unwrap();

        store
            .toggle_retweet(&quoter.id, &post.id, Some("so true".to_string()))
            .await
            .unwrap();

        let tables = store.tables.read().await;
        assert_eq!(tables.retweets[0].comment.as_deref(), Some("so true"));
        // No quoted post was materialized.
        assert_eq!(tables.posts.len(), 1);
    }
}
